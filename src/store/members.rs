use tracing::info;

use crate::error::{LibraryError, RecordKind, Result};
use crate::models::{Member, MemberId};

use super::{ensure_capacity, FileStore, RecordStore};

/// Registered members. There is no delete or edit; members only accumulate.
pub struct MemberRepository<S = FileStore<Member>> {
    store: S,
    capacity: Option<usize>,
}

impl<S: RecordStore<Member>> MemberRepository<S> {
    pub fn new(store: S, capacity: Option<usize>) -> Self {
        Self { store, capacity }
    }

    pub fn load(&self) -> Result<Vec<Member>> {
        self.store.load()
    }

    /// Register a member. The capacity check runs before the ID is looked at,
    /// then the ID must be eleven digits and not already taken.
    pub fn add(&self, id: &str, name: &str, phone: &str) -> Result<Member> {
        let mut members = self.load()?;
        ensure_capacity(members.len(), self.capacity, "member")?;

        let id: MemberId = id.parse()?;
        if members.iter().any(|member| member.id == id) {
            return Err(LibraryError::duplicate(RecordKind::Member, id));
        }

        let member = Member {
            id,
            name: name.to_string(),
            phone: phone.to_string(),
        };
        members.push(member.clone());
        self.store.save(&members)?;
        info!(id = %member.id, "member added");
        Ok(member)
    }

    /// Look a member up by the raw ID text. Text that is not a valid ID simply
    /// matches nobody.
    pub fn search(&self, id: &str) -> Result<Option<Member>> {
        Ok(self.load()?.into_iter().find(|member| member.id == *id))
    }

    pub fn list(&self) -> Result<Vec<Member>> {
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;

    fn setup_repository() -> (TempDir, MemberRepository) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let repo =
            MemberRepository::new(FileStore::new(tmp.path().join("members.txt")), Some(100));
        (tmp, repo)
    }

    #[test]
    fn added_member_can_be_found() {
        let (_tmp, repo) = setup_repository();
        let added = repo.add("12345678901", "Alice", "555").unwrap();

        assert_eq!(repo.search("12345678901").unwrap(), Some(added));
        assert_eq!(repo.search("10987654321").unwrap(), None);
        assert_eq!(repo.search("not an id").unwrap(), None);
    }

    #[test_case("1234567890" ; "too short")]
    #[test_case("123456789012" ; "too long")]
    #[test_case("12345abc901" ; "letters")]
    #[test_case("" ; "empty")]
    fn invalid_ids_are_rejected(id: &str) {
        let (_tmp, repo) = setup_repository();
        let err = repo.add(id, "Bob", "123").unwrap_err();
        assert!(matches!(err, LibraryError::InvalidId(_)));
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn duplicate_id_is_rejected_without_changes() {
        let (_tmp, repo) = setup_repository();
        repo.add("12345678901", "Alice", "555").unwrap();

        let err = repo.add("12345678901", "Mallory", "666").unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateId { kind: RecordKind::Member, .. }));

        let members = repo.list().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Alice");
    }

    #[test]
    fn capacity_is_checked_before_the_id() {
        let tmp = TempDir::new().unwrap();
        let repo = MemberRepository::new(FileStore::new(tmp.path().join("members.txt")), Some(1));
        repo.add("12345678901", "Alice", "555").unwrap();

        let err = repo.add("bad", "Bob", "1").unwrap_err();
        assert!(matches!(err, LibraryError::CapacityExceeded { kind: "member", capacity: 1 }));
    }

    #[test]
    fn members_list_in_registration_order() {
        let (_tmp, repo) = setup_repository();
        repo.add("22222222222", "Bob", "2").unwrap();
        repo.add("11111111111", "Alice", "1").unwrap();

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Bob", "Alice"]);
    }
}
