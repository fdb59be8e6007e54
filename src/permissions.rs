//! Permission evaluation for Biblos resources
//!
//! A single declarative table maps (resource kind, action) to the set of
//! permission names a principal must hold. Anything absent from the table is
//! denied, including for authenticated principals with no permissions.

use crate::{
    error::{AppError, AppResult},
    models::user::Principal,
};

/// Resource kinds the evaluator knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Book,
    Author,
    Genre,
    CheckoutLedger,
    UserDirectory,
}

/// Actions a principal can request on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Destroy,
    Checkout,
    Return,
    ViewOverdue,
}

/// Permissions required for an action on a resource kind.
///
/// `None` means the pair is not in the policy at all: denied for everyone.
pub fn required_permissions(resource: Resource, action: Action) -> Option<&'static [&'static str]> {
    use Action::*;
    use Resource::*;

    match (resource, action) {
        (Book, List) | (Book, Retrieve) => Some(&["view_book"]),
        (Book, Create) | (Book, Update) => Some(&["add_book", "change_book"]),
        (Book, Destroy) => Some(&["delete_book"]),
        (Book, Checkout) => Some(&["add_checkout"]),

        (Author, List) | (Author, Retrieve) => Some(&["view_author"]),
        (Author, Create) | (Author, Update) => Some(&["add_author", "change_author"]),
        (Author, Destroy) => Some(&["delete_author"]),

        (Genre, List) => Some(&["view_genre"]),
        (Genre, Create) => Some(&["add_genre"]),
        (Genre, Destroy) => Some(&["delete_genre"]),

        (CheckoutLedger, List) | (CheckoutLedger, Retrieve) | (CheckoutLedger, ViewOverdue) => {
            Some(&["view_checkout"])
        }
        (CheckoutLedger, Update) => Some(&["add_checkout", "change_checkout"]),
        (CheckoutLedger, Return) | (CheckoutLedger, Destroy) => Some(&["delete_checkout"]),

        (UserDirectory, List) => Some(&["view_user"]),

        _ => None,
    }
}

/// Check whether a principal may perform an action on a resource kind
pub fn is_allowed(principal: &Principal, action: Action, resource: Resource) -> bool {
    match required_permissions(resource, action) {
        Some(required) => required.iter().all(|p| principal.has_permission(p)),
        None => false,
    }
}

/// Authorize or fail with `Forbidden`
pub fn authorize(principal: &Principal, action: Action, resource: Resource) -> AppResult<()> {
    if is_allowed(principal, action, resource) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Permission denied for {:?} on {:?}",
            action, resource
        )))
    }
}

/// Reference group policy.
///
/// Group membership comes from the identity provider; these are the
/// permission sets the stock groups carry. Unknown groups grant nothing.
pub fn group_permissions(group: &str) -> &'static [&'static str] {
    match group {
        "General" => &[
            "view_author",
            "view_book",
            "add_checkout",
            "change_checkout",
            "view_checkout",
            "delete_checkout",
            "view_genre",
        ],
        "Editor" => &[
            "add_author",
            "change_author",
            "view_author",
            "add_book",
            "change_book",
            "view_book",
            "add_checkout",
            "change_checkout",
            "view_checkout",
            "delete_checkout",
            "add_genre",
            "change_genre",
            "view_genre",
        ],
        "Administrator" => &[
            "add_author",
            "change_author",
            "view_author",
            "delete_author",
            "add_book",
            "view_book",
            "change_book",
            "delete_book",
            "add_checkout",
            "change_checkout",
            "view_checkout",
            "delete_checkout",
            "add_genre",
            "change_genre",
            "view_genre",
            "delete_genre",
            "view_user",
        ],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(groups: &[&str]) -> Principal {
        Principal::new(
            1,
            "Dave".to_string(),
            "Smith".to_string(),
            groups.iter().map(|g| g.to_string()).collect(),
        )
    }

    #[test]
    fn test_no_permissions_denies_everything() {
        let p = principal(&[]);
        assert!(!is_allowed(&p, Action::List, Resource::Book));
        assert!(!is_allowed(&p, Action::Checkout, Resource::Book));
        assert!(!is_allowed(&p, Action::List, Resource::CheckoutLedger));
        assert!(!is_allowed(&p, Action::List, Resource::UserDirectory));
    }

    #[test]
    fn test_actions_outside_the_table_are_denied() {
        let admin = principal(&["Administrator"]);
        // Genres only support list/create/destroy
        assert!(!is_allowed(&admin, Action::Retrieve, Resource::Genre));
        assert!(!is_allowed(&admin, Action::Update, Resource::Genre));
        // The directory is read-only
        assert!(!is_allowed(&admin, Action::Create, Resource::UserDirectory));
        assert!(!is_allowed(&admin, Action::Destroy, Resource::UserDirectory));
    }

    #[test]
    fn test_general_can_borrow_but_not_edit() {
        let p = principal(&["General"]);
        assert!(is_allowed(&p, Action::List, Resource::Book));
        assert!(is_allowed(&p, Action::Checkout, Resource::Book));
        assert!(is_allowed(&p, Action::Return, Resource::CheckoutLedger));
        assert!(is_allowed(&p, Action::Update, Resource::CheckoutLedger));
        assert!(!is_allowed(&p, Action::Create, Resource::Book));
        assert!(!is_allowed(&p, Action::Destroy, Resource::Book));
        assert!(!is_allowed(&p, Action::List, Resource::UserDirectory));
    }

    #[test]
    fn test_editor_can_edit_but_not_delete_catalog() {
        let p = principal(&["Editor"]);
        assert!(is_allowed(&p, Action::Create, Resource::Book));
        assert!(is_allowed(&p, Action::Update, Resource::Author));
        assert!(is_allowed(&p, Action::Create, Resource::Genre));
        assert!(!is_allowed(&p, Action::Destroy, Resource::Book));
        assert!(!is_allowed(&p, Action::Destroy, Resource::Author));
        assert!(!is_allowed(&p, Action::Destroy, Resource::Genre));
        assert!(!is_allowed(&p, Action::List, Resource::UserDirectory));
    }

    #[test]
    fn test_administrator_has_full_policy() {
        let p = principal(&["Administrator"]);
        assert!(is_allowed(&p, Action::Destroy, Resource::Book));
        assert!(is_allowed(&p, Action::Destroy, Resource::Author));
        assert!(is_allowed(&p, Action::Destroy, Resource::Genre));
        assert!(is_allowed(&p, Action::ViewOverdue, Resource::CheckoutLedger));
        assert!(is_allowed(&p, Action::List, Resource::UserDirectory));
        assert!(p.is_admin());
    }

    #[test]
    fn test_create_requires_both_add_and_change() {
        // A principal holding only add_book must not pass the Create gate
        let mut p = principal(&[]);
        p.permissions.insert("add_book".to_string());
        assert!(!is_allowed(&p, Action::Create, Resource::Book));
        p.permissions.insert("change_book".to_string());
        assert!(is_allowed(&p, Action::Create, Resource::Book));
    }

    #[test]
    fn test_group_union() {
        let p = principal(&["General", "Editor"]);
        assert!(is_allowed(&p, Action::Create, Resource::Book));
        assert!(is_allowed(&p, Action::Checkout, Resource::Book));
        assert!(!p.is_admin());
    }

    #[test]
    fn test_unknown_group_grants_nothing() {
        let p = principal(&["Visitor"]);
        assert!(!is_allowed(&p, Action::List, Resource::Book));
    }

    #[test]
    fn test_authorize_err_is_forbidden() {
        let p = principal(&[]);
        let err = authorize(&p, Action::List, Resource::Book).unwrap_err();
        assert_eq!(err.code(), "Forbidden");
    }
}
