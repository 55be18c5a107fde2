//! Composable row predicates.
//!
//! A [`Where`] is a SQL fragment plus the values bound into it. Values
//! are never spliced into the fragment text, they travel as bind
//! parameters, so no quoting of user-supplied strings ever happens here.
//!
//! The algebra treats the unit [`Where::any`] as identity: combining any
//! predicate with it yields the original predicate unchanged.

use crate::table::Entity;

/// A single value bound into a predicate or assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Text(String),
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}
impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Int(i64::from(value))
    }
}
impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}
impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A row filter: rendered SQL fragment plus its bind parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    sql: String,
    args: Vec<Arg>,
}

impl Where {
    /// The unit predicate: matches every row, composes as identity.
    pub fn any() -> Self {
        Self::default()
    }

    fn fragment(sql: impl Into<String>, args: Vec<Arg>) -> Self {
        Self { sql: sql.into(), args }
    }

    /// Primary-key equality.
    pub fn me(id: i64) -> Self {
        Self::fragment("_id = ?", vec![Arg::Int(id)])
    }

    /// The entity-specific "has unread content" filter: `ISNEW = 1` for
    /// authors and works, `NEW_NUMBER > 0` for groups.
    pub fn is_new<E: Entity>() -> Self {
        Self::fragment(E::NEW_SQL, vec![])
    }

    /// Rows whose foreign key references the entity `E` with this id
    /// (`AUTHOR_ID = ?`, `GROUP_ID = ?`, ... depending on `E`).
    pub fn owned_by<E: Entity>(id: i64) -> Self {
        Self::fragment(format!("{} = ?", E::FK_COLUMN), vec![Arg::Int(id)])
    }

    /// Rows belonging to this author.
    pub fn author_is(author: &crate::AuthorRow) -> Self {
        Self::owned_by::<crate::AuthorRow>(author.id)
    }

    /// Rows belonging to this group.
    pub fn group_is(group: &crate::GroupRow) -> Self {
        Self::owned_by::<crate::GroupRow>(group.id)
    }

    /// Rows referencing this work.
    pub fn work_is(work: &crate::WorkRow) -> Self {
        Self::owned_by::<crate::WorkRow>(work.id)
    }

    /// Author-URL equality.
    pub fn url_is(url: &str) -> Self {
        Self::fragment("URL = ?", vec![Arg::Text(url.to_owned())])
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn and(self, other: Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (_, true) => self,
            (true, false) => other,
            (false, false) => self.join("AND", other),
        }
    }

    pub fn or(self, other: Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (_, true) => self,
            (true, false) => other,
            (false, false) => self.join("OR", other),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        if self.is_empty() {
            return self;
        }
        Self {
            sql: format!("NOT ({})", self.sql),
            args: self.args,
        }
    }

    fn join(mut self, op: &str, other: Self) -> Self {
        self.sql = format!("({} {op} {})", self.sql, other.sql);
        self.args.extend(other.args);
        self
    }

    pub(crate) fn sql(&self) -> &str {
        &self.sql
    }

    pub(crate) fn args(&self) -> &[Arg] {
        &self.args
    }
}

/// A single `column = value` assignment for targeted updates.
///
/// The column name comes from code (a `&'static str`), only the value is
/// bound, mirroring the parameter discipline of [`Where`].
#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub(crate) column: &'static str,
    pub(crate) value: Arg,
}

impl Set {
    pub fn new(column: &'static str, value: impl Into<Arg>) -> Self {
        Self { column, value: value.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthorRow, GroupRow, WorkRow};
    use rstest::rstest;

    #[test]
    fn test_any_is_identity() {
        let p = Where::me(7);
        assert_eq!(p.clone().and(Where::any()), p);
        assert_eq!(Where::any().and(p.clone()), p);
        assert_eq!(p.clone().or(Where::any()), p);
        assert_eq!(Where::any().or(p.clone()), p);
    }

    #[test]
    fn test_double_negation_preserves_meaning() {
        let p = Where::is_new::<WorkRow>();
        let twice = p.clone().not().not();
        assert_eq!(twice.sql(), "NOT (NOT (ISNEW = 1))");
        assert_eq!(twice.args(), p.args());
        assert!(Where::any().not().is_empty());
    }

    #[test]
    fn test_conjunction_renders_parenthesised() {
        let p = Where::owned_by::<AuthorRow>(3).and(Where::is_new::<WorkRow>());
        assert_eq!(p.sql(), "(AUTHOR_ID = ? AND ISNEW = 1)");
        assert_eq!(p.args(), &[Arg::Int(3)]);
    }

    #[test]
    fn test_disjunction_is_commutative_in_operands() {
        let lhs = Where::me(1).or(Where::me(2));
        let rhs = Where::me(2).or(Where::me(1));
        assert_eq!(lhs.sql(), rhs.sql());
        let mut left_args = lhs.args().to_vec();
        let mut right_args = rhs.args().to_vec();
        let key = |a: &Arg| match a {
            Arg::Int(i) => *i,
            Arg::Text(_) => i64::MAX,
        };
        left_args.sort_by_key(key);
        right_args.sort_by_key(key);
        assert_eq!(left_args, right_args);
    }

    #[rstest]
    #[case(Where::owned_by::<AuthorRow>(1), "AUTHOR_ID = ?")]
    #[case(Where::owned_by::<GroupRow>(1), "GROUP_ID = ?")]
    #[case(Where::owned_by::<WorkRow>(1), "BOOK_ID = ?")]
    #[case(Where::is_new::<AuthorRow>(), "ISNEW = 1")]
    #[case(Where::is_new::<GroupRow>(), "NEW_NUMBER > 0")]
    fn test_entity_specific_columns(#[case] predicate: Where, #[case] expected: &str) {
        assert_eq!(predicate.sql(), expected);
    }

    #[test]
    fn test_text_values_are_bound_not_spliced() {
        let p = Where::url_is("/s/it's-a-quote/");
        assert_eq!(p.sql(), "URL = ?");
        assert_eq!(p.args(), &[Arg::Text("/s/it's-a-quote/".to_owned())]);
    }
}
