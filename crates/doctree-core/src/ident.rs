//! Structured symbol identifiers
//!
//! Parsers hand out ids such as `UI.Button#render` or `Element@click.once`.
//! They are parsed once into a [`QualifiedName`]; every parent, name and path
//! computation in the resolver works on the parsed form instead of scanning
//! the string for delimiters.

use std::cmp::Ordering;
use std::fmt;

/// Delimiter joining a segment to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// `.` - class/static member or nested entity
    Static,
    /// `#` - instance member
    Instance,
    /// `@` - event
    Event,
}

impl Qualifier {
    /// The delimiter character used in string ids
    pub fn as_char(self) -> char {
        match self {
            Qualifier::Static => '.',
            Qualifier::Instance => '#',
            Qualifier::Event => '@',
        }
    }

    /// Path fragment used for navigation (`#` becomes `.prototype.`)
    fn path_fragment(self) -> &'static str {
        match self {
            Qualifier::Static => ".",
            Qualifier::Instance => ".prototype.",
            Qualifier::Event => ".event.",
        }
    }
}

/// A parsed hierarchical id.
///
/// The first `@` always starts the final event segment, which is kept
/// verbatim even when it contains `.` or `#`. Before it, every `.` and `#`
/// starts a new member segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    head: String,
    members: Vec<(Qualifier, String)>,
}

impl QualifiedName {
    /// Parse a string id
    pub fn parse(id: &str) -> Self {
        let (structural, event) = match id.find('@') {
            Some(at) => (&id[..at], Some(&id[at + 1..])),
            None => (id, None),
        };

        let mut head = String::new();
        let mut members = Vec::new();
        let mut current = String::new();
        let mut pending: Option<Qualifier> = None;

        for c in structural.chars() {
            let qualifier = match c {
                '.' => Qualifier::Static,
                '#' => Qualifier::Instance,
                _ => {
                    current.push(c);
                    continue;
                }
            };
            let segment = std::mem::take(&mut current);
            match pending {
                None => head = segment,
                Some(q) => members.push((q, segment)),
            }
            pending = Some(qualifier);
        }

        match pending {
            None => head = current,
            Some(q) => members.push((q, current)),
        }

        if let Some(event) = event {
            members.push((Qualifier::Event, event.to_string()));
        }

        Self { head, members }
    }

    /// The leading segment (the section part of a collection key)
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Qualified segments after the head
    pub fn members(&self) -> &[(Qualifier, String)] {
        &self.members
    }

    /// The segment right after the head, if any
    pub fn second(&self) -> Option<&str> {
        self.members.first().map(|(_, segment)| segment.as_str())
    }

    /// Qualifier of the trailing segment; `None` for a bare head
    pub fn qualifier(&self) -> Option<Qualifier> {
        self.members.last().map(|(q, _)| *q)
    }

    /// Whether any segment is joined with the given qualifier
    pub fn contains(&self, qualifier: Qualifier) -> bool {
        self.members.iter().any(|(q, _)| *q == qualifier)
    }

    /// Trailing segment
    pub fn name(&self) -> &str {
        self.members
            .last()
            .map_or(self.head.as_str(), |(_, segment)| segment.as_str())
    }

    /// Everything before the trailing segment, including its delimiter
    pub fn name_prefix(&self) -> String {
        match (self.parent(), self.qualifier()) {
            (Some(parent), Some(q)) => format!("{}{}", parent, q.as_char()),
            _ => String::new(),
        }
    }

    /// Id of the structural parent, `None` when there is no delimiter
    pub fn parent(&self) -> Option<QualifiedName> {
        if self.members.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.members.pop();
        Some(parent)
    }

    /// Drop the leading section segment.
    ///
    /// Sections are always joined with `.`; ids whose first delimiter is
    /// anything else are returned unchanged.
    pub fn strip_head(&self) -> QualifiedName {
        match self.members.split_first() {
            Some(((Qualifier::Static, first), rest)) => QualifiedName {
                head: first.clone(),
                members: rest.to_vec(),
            },
            _ => self.clone(),
        }
    }

    /// Replace the head segment
    pub fn with_head(&self, head: &str) -> QualifiedName {
        QualifiedName {
            head: head.to_string(),
            members: self.members.clone(),
        }
    }

    /// The instance-member twin of a static member (`A.b` to `A#b`)
    pub fn to_instance_member(&self) -> Option<QualifiedName> {
        match self.members.last() {
            Some((Qualifier::Static, _)) => {
                let mut twin = self.clone();
                if let Some(last) = twin.members.last_mut() {
                    last.0 = Qualifier::Instance;
                }
                Some(twin)
            }
            _ => None,
        }
    }

    /// Navigation path: `#` becomes `.prototype.` and `@` becomes `.event.`
    pub fn path(&self) -> String {
        let mut path = self.head.clone();
        for (q, segment) in &self.members {
            path.push_str(q.path_fragment());
            path.push_str(segment);
        }
        path
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.head)?;
        for (q, segment) in &self.members {
            write!(f, "{}{}", q.as_char(), segment)?;
        }
        Ok(())
    }
}

/// Canonical id ordering.
///
/// Ids compare segment by segment, case-insensitively: every delimiter sorts
/// below any other character, so `Button.disable` precedes `Button#render`
/// and an id always precedes the ids nested under it. Ties are broken by the
/// raw string so the order never depends on input order.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(sort_key(b)).then_with(|| a.cmp(b))
}

fn sort_key(id: &str) -> impl Iterator<Item = char> + '_ {
    id.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if matches!(c, '.' | '#' | '@') { '\0' } else { c })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static_and_instance() {
        let name = QualifiedName::parse("UI.Button#render");
        assert_eq!(name.head(), "UI");
        assert_eq!(name.name(), "render");
        assert_eq!(name.qualifier(), Some(Qualifier::Instance));
        assert_eq!(name.parent().unwrap().to_string(), "UI.Button");
        assert_eq!(name.name_prefix(), "UI.Button#");
    }

    #[test]
    fn test_event_segment_keeps_delimiters() {
        let name = QualifiedName::parse("UI.Element@click.once#x");
        assert_eq!(name.name(), "click.once#x");
        assert_eq!(name.qualifier(), Some(Qualifier::Event));
        assert_eq!(name.parent().unwrap().to_string(), "UI.Element");
        assert_eq!(name.to_string(), "UI.Element@click.once#x");
    }

    #[test]
    fn test_path_rewrites_qualifiers() {
        let name = QualifiedName::parse("Element#on@change");
        assert_eq!(name.path(), "Element.prototype.on.event.change");
    }

    #[test]
    fn test_strip_head() {
        let name = QualifiedName::parse(".Button.disable");
        assert_eq!(name.head(), "");
        assert_eq!(name.second(), Some("Button"));
        assert_eq!(name.strip_head().to_string(), "Button.disable");

        let section = QualifiedName::parse("UI");
        assert_eq!(section.strip_head().to_string(), "UI");
        assert!(section.parent().is_none());
    }

    #[test]
    fn test_instance_twin() {
        let name = QualifiedName::parse("Element.foo");
        assert_eq!(name.to_instance_member().unwrap().to_string(), "Element#foo");
        assert!(QualifiedName::parse("Element#foo").to_instance_member().is_none());
    }

    #[test]
    fn test_compare_ids_case_insensitive() {
        let mut ids = vec!["b", "A", "a", "B.c", "b.a"];
        ids.sort_by(|a, b| compare_ids(a, b));
        assert_eq!(ids, vec!["A", "a", "b", "b.a", "B.c"]);
    }

    #[test]
    fn test_compare_ids_segment_wise() {
        let mut ids = vec!["UI.Button#render", "UI.Button.disable", "UI.Button", "UI"];
        ids.sort_by(|a, b| compare_ids(a, b));
        assert_eq!(ids, vec!["UI", "UI.Button", "UI.Button.disable", "UI.Button#render"]);
        assert_eq!(compare_ids("a.b", "ab"), Ordering::Less);
    }
}
