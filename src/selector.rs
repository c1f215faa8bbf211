/// Represents ways to locate a node in the accessibility tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Match against visible text or content description.
    /// `exact` compares trimmed equality, otherwise substring containment.
    Text { value: String, exact: bool },
    /// Match by view resource identifier, selecting the `index`-th
    /// occurrence in depth-first pre-order across the whole tree.
    ResourceId { id: String, index: usize },
    /// Match by class name (substring containment)
    ClassName(String),
    /// The n-th editable input widget in traversal order
    EditableIndex(usize),
    /// The n-th scrollable container in traversal order
    ScrollableIndex(usize),
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl Selector {
    /// Substring text selector
    pub fn text(value: impl Into<String>) -> Self {
        Selector::Text {
            value: value.into(),
            exact: false,
        }
    }

    /// Exact (trimmed) text selector
    pub fn exact_text(value: impl Into<String>) -> Self {
        Selector::Text {
            value: value.into(),
            exact: true,
        }
    }

    /// Resource-id selector for the first occurrence
    pub fn resource_id(id: impl Into<String>) -> Self {
        Selector::ResourceId {
            id: id.into(),
            index: 0,
        }
    }

    /// Resource-id selector for the n-th occurrence
    pub fn resource_id_nth(id: impl Into<String>, index: usize) -> Self {
        Selector::ResourceId {
            id: id.into(),
            index,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        match s {
            _ if s.starts_with("text:") => Selector::text(&s[5..]),
            _ if s.starts_with("exact:") => Selector::exact_text(&s[6..]),
            _ if s.starts_with("id:") => {
                // `id:<resource-id>@<n>` selects the n-th occurrence; the
                // resource id itself may contain colons and slashes.
                let rest = &s[3..];
                match rest.rsplit_once('@') {
                    Some((id, idx)) if idx.chars().all(|c| c.is_ascii_digit()) && !idx.is_empty() => {
                        Selector::ResourceId {
                            id: id.to_string(),
                            index: idx.parse().unwrap_or(0),
                        }
                    }
                    _ => Selector::resource_id(rest),
                }
            }
            _ if s.to_lowercase().starts_with("class:") => {
                Selector::ClassName(s[6..].to_string())
            }
            _ if s.to_lowercase().starts_with("editable:") => {
                match s[9..].parse::<usize>() {
                    Ok(n) => Selector::EditableIndex(n),
                    Err(_) => Selector::Invalid(format!(
                        "Invalid index for editable selector: '{}'",
                        &s[9..]
                    )),
                }
            }
            _ if s.to_lowercase().starts_with("scrollable:") => {
                match s[11..].parse::<usize>() {
                    Ok(n) => Selector::ScrollableIndex(n),
                    Err(_) => Selector::Invalid(format!(
                        "Invalid index for scrollable selector: '{}'",
                        &s[11..]
                    )),
                }
            }
            _ => Selector::Invalid(format!(
                "Unknown selector format: \"{s}\". Use prefixes like 'text:', 'exact:', 'id:', 'class:', 'editable:' or 'scrollable:' to specify the selector type."
            )),
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}
