//! Member directory used to resolve authors and mentions.

use super::identifiers::MemberId;
use super::log_line::LineColor;
use std::collections::HashMap;

/// A channel member as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Remote member id.
    pub id: MemberId,
    /// Name shown in the log.
    pub name: String,
}

impl Member {
    /// Create a member record.
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// How a member is shown in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    /// Name shown in the log prefix and in resolved mentions.
    pub display_name: String,
    /// Color of the member's lines.
    pub color: LineColor,
}

/// Mapping from member id to display profile.
///
/// Rebuilt on every successful (re)connect and read-only until the next one.
#[derive(Debug, Clone, Default)]
pub struct MemberDirectory {
    members: HashMap<MemberId, MemberProfile>,
}

impl MemberDirectory {
    /// Empty directory. Every author lookup fails until populated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory, assigning palette colors in the order given.
    pub fn from_members(members: impl IntoIterator<Item = Member>) -> Self {
        let members = members
            .into_iter()
            .enumerate()
            .map(|(index, member)| {
                (
                    member.id,
                    MemberProfile {
                        display_name: member.name,
                        color: LineColor::for_member(index),
                    },
                )
            })
            .collect();
        Self { members }
    }

    /// Look up a member's profile.
    pub fn get(&self, id: &MemberId) -> Option<&MemberProfile> {
        self.members.get(id)
    }

    /// Look up a member by raw id string.
    pub fn get_raw(&self, id: &str) -> Option<&MemberProfile> {
        MemberId::new(id).ok().and_then(|id| self.members.get(&id))
    }

    /// Number of known members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the directory has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, name: &str) -> Member {
        Member::new(MemberId::new(id).unwrap(), name)
    }

    #[test]
    fn assigns_palette_in_order() {
        let dir = MemberDirectory::from_members(vec![member("U1", "alice"), member("U2", "bob")]);
        assert_eq!(dir.get_raw("U1").unwrap().color, LineColor::for_member(0));
        assert_eq!(dir.get_raw("U2").unwrap().color, LineColor::for_member(1));
    }

    #[test]
    fn thirteenth_member_wraps_to_first_color() {
        let members = (0..13).map(|i| member(&format!("U{i}"), &format!("user{i}")));
        let dir = MemberDirectory::from_members(members);
        assert_eq!(dir.len(), 13);
        assert_eq!(dir.get_raw("U12").unwrap().color, dir.get_raw("U0").unwrap().color);
    }

    #[test]
    fn unknown_id_is_none() {
        let dir = MemberDirectory::from_members(vec![member("U1", "alice")]);
        assert!(dir.get_raw("U9").is_none());
        assert!(dir.get_raw("").is_none());
    }
}
