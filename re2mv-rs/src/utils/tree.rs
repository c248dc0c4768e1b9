//! Tree structure rendering utilities for skeleton visualization

use console::Style;

/// Represents a node in a tree structure
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    pub metadata: Vec<(String, String)>,
}

/// Types of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    File,
    Root,
    Part,
}

/// Options for tree rendering
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
    pub compact: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            no_color: false,
            show_metadata: true,
            compact: false,
        }
    }
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Add a child node
    #[must_use]
    pub fn add_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Add metadata, kept in insertion order
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.push((key.to_string(), value.into()));
        self
    }
}

impl NodeType {
    /// Get emoji icon for node type
    pub const fn icon(self) -> &'static str {
        match self {
            Self::File => "📄",
            Self::Root => "🦴",
            Self::Part => "🔗",
        }
    }

    /// Get color style for node type
    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                Self::File => Style::new().bold().cyan(),
                Self::Root => Style::new().bold().yellow(),
                Self::Part => Style::new().green(),
            }
        }
    }
}

/// Render a tree structure to string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

/// Render a single node and its children
fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    if let Some(max_depth) = options.max_depth
        && depth > max_depth
    {
        return;
    }

    let icon = node.node_type.icon();
    let style = node.node_type.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    let mut line = format!("{prefix}{connector}{icon} {}", style.apply_to(&node.name));

    if options.show_metadata && options.compact && !node.metadata.is_empty() {
        let meta_parts: Vec<String> = node
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        line.push_str(&format!(" [{}]", meta_parts.join(", ")));
    }

    output.push_str(&line);
    output.push('\n');

    let child_prefix = if depth == 0 {
        ""
    } else if is_last {
        "    "
    } else {
        "│   "
    };

    if options.show_metadata && !options.compact {
        let meta_prefix = format!("{prefix}{child_prefix}    ");
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };

        for (key, value) in &node.metadata {
            output.push_str(&format!(
                "{meta_prefix}🏷️  {}: {value}\n",
                meta_style.apply_to(key)
            ));
        }
    }

    let new_prefix = format!("{prefix}{child_prefix}");
    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i + 1 == node.children.len();
        render_node(child, output, &new_prefix, is_last_child, depth + 1, options);
    }
}
