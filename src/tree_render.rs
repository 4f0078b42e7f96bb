//! ASCII tree rendering for the folder forest.

use crate::models::FolderTreeNode;

const FOLDER: char = '▸';
const FEATURE: char = '•';
const TRUNCATED: &str = "…";

enum Line<'a> {
    Root(&'a FolderTreeNode),
    Feature {
        name: &'a str,
        prefix: String,
        is_last: bool,
    },
    Folder {
        node: &'a FolderTreeNode,
        prefix: String,
        is_last: bool,
    },
    Truncated {
        prefix: String,
    },
}

/// Render the folder forest as ASCII art.
///
/// Each folder lists its features before its subfolders. A folder whose
/// children were cut off by the depth limit ends with a `…` line.
///
/// Example output:
/// ```text
/// Payments
/// ├── • Refund flow
/// ├── ▸ Reports
/// │   └── • Monthly totals
/// └── ▸ Archive
/// ```
pub fn render_tree(nodes: &[FolderTreeNode]) -> String {
    let mut output = String::new();
    let mut stack: Vec<Line<'_>> = nodes.iter().rev().map(Line::Root).collect();

    while let Some(line) = stack.pop() {
        match line {
            Line::Root(node) => {
                output.push_str(&node.folder.name);
                output.push('\n');
                push_contents(&mut stack, node, "");
            }
            Line::Feature {
                name,
                prefix,
                is_last,
            } => push_line(&mut output, &prefix, is_last, FEATURE, name),
            Line::Folder {
                node,
                prefix,
                is_last,
            } => {
                push_line(&mut output, &prefix, is_last, FOLDER, &node.folder.name);
                let continuation = if is_last { "    " } else { "│   " };
                push_contents(&mut stack, node, &format!("{}{}", prefix, continuation));
            }
            Line::Truncated { prefix } => {
                output.push_str(&prefix);
                output.push_str("└── ");
                output.push_str(TRUNCATED);
                output.push('\n');
            }
        }
    }
    output
}

/// Queue the lines under `node` so they pop in display order.
fn push_contents<'a>(stack: &mut Vec<Line<'a>>, node: &'a FolderTreeNode, prefix: &str) {
    let total = node.features.len() + node.children.len() + usize::from(node.children_truncated);
    let mut lines = Vec::with_capacity(total);

    for feature in &node.features {
        lines.push(Line::Feature {
            name: &feature.name,
            prefix: prefix.to_string(),
            is_last: lines.len() + 1 == total,
        });
    }
    for child in &node.children {
        lines.push(Line::Folder {
            node: child,
            prefix: prefix.to_string(),
            is_last: lines.len() + 1 == total,
        });
    }
    if node.children_truncated {
        lines.push(Line::Truncated {
            prefix: prefix.to_string(),
        });
    }

    stack.extend(lines.into_iter().rev());
}

fn push_line(output: &mut String, prefix: &str, is_last: bool, symbol: char, name: &str) {
    output.push_str(prefix);
    output.push_str(if is_last { "└── " } else { "├── " });
    output.push(symbol);
    output.push(' ');
    output.push_str(name);
    output.push('\n');
}
