//! Dynamic client filters. Every predicate is optional and the present ones
//! are combined with AND; the same rules are available as a SeaORM
//! `Condition` and as an in-memory matcher.

use sea_orm::{
    sea_query::{Alias, BinOper, Expr, Func, SimpleExpr},
    ColumnTrait, Condition, IntoSimpleExpr,
};
use serde::{Deserialize, Serialize};

use models::{client, personal_info, user};
use super::domain::{clean, ClientRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientFilters {
    /// case-insensitive substring of the client uuid
    pub uuid: Option<String>,
    pub vat: Option<String>,
    pub username: Option<String>,
    /// case-insensitive substring
    pub first_name: Option<String>,
    /// case-insensitive substring
    pub last_name: Option<String>,
    /// personal-info email
    pub email: Option<String>,
    pub phone: Option<String>,
    /// user account active flag
    pub active: Option<bool>,
}

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}

/// `LOWER(expr) LIKE LOWER('%fragment%')`; both sides fold case in the database.
fn lower_like_expr(expr: SimpleExpr, fragment: &str) -> SimpleExpr {
    Expr::expr(Func::lower(expr)).binary(BinOper::Like, Func::lower(Expr::val(like_contains(fragment))))
}

fn lower_like<C: ColumnTrait>(col: C, fragment: &str) -> SimpleExpr {
    lower_like_expr(col.into_simple_expr(), fragment)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl ClientFilters {
    /// Same filters with blank values dropped.
    pub fn normalized(&self) -> Self {
        Self {
            uuid: clean(self.uuid.clone()),
            vat: clean(self.vat.clone()),
            username: clean(self.username.clone()),
            first_name: clean(self.first_name.clone()),
            last_name: clean(self.last_name.clone()),
            email: clean(self.email.clone()),
            phone: clean(self.phone.clone()),
            active: self.active,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized() == Self::default()
    }

    /// SQL form; expects `user` inner-joined and `personal_info` left-joined to `client`.
    pub fn to_condition(&self) -> Condition {
        let f = self.normalized();
        let mut cond = Condition::all();
        if let Some(v) = f.uuid.as_deref() { cond = cond.add(lower_like(client::Column::Uuid, v)); }
        if let Some(v) = f.vat { cond = cond.add(client::Column::Vat.eq(v)); }
        if let Some(v) = f.username { cond = cond.add(user::Column::Username.eq(v)); }
        if let Some(v) = f.first_name.as_deref() { cond = cond.add(lower_like(personal_info::Column::FirstName, v)); }
        if let Some(v) = f.last_name.as_deref() { cond = cond.add(lower_like(personal_info::Column::LastName, v)); }
        if let Some(v) = f.email { cond = cond.add(personal_info::Column::Email.eq(v)); }
        if let Some(v) = f.phone { cond = cond.add(personal_info::Column::Phone.eq(v)); }
        if let Some(v) = f.active { cond = cond.add(user::Column::IsActive.eq(v)); }
        cond
    }

    /// In-memory form of [`ClientFilters::to_condition`].
    pub fn matches(&self, r: &ClientRecord) -> bool {
        let f = self.normalized();
        let pi = r.personal_info.as_ref();
        f.uuid.as_deref().map_or(true, |v| contains_ci(&r.client.uuid, v))
            && f.vat.as_deref().map_or(true, |v| r.client.vat.as_deref() == Some(v))
            && f.username.as_deref().map_or(true, |v| r.user.username == v)
            && f.first_name.as_deref().map_or(true, |v| pi.is_some_and(|p| contains_ci(&p.first_name, v)))
            && f.last_name.as_deref().map_or(true, |v| pi.is_some_and(|p| contains_ci(&p.last_name, v)))
            && f.email.as_deref().map_or(true, |v| pi.and_then(|p| p.email.as_deref()) == Some(v))
            && f.phone.as_deref().map_or(true, |v| pi.and_then(|p| p.phone.as_deref()) == Some(v))
            && f.active.map_or(true, |v| r.user.is_active == v)
    }
}

/// Case-insensitive match on first name, last name or "first last".
pub fn name_condition(fragment: &str) -> Condition {
    let full_name = Func::cust(Alias::new("CONCAT"))
        .arg(personal_info::Column::FirstName.into_simple_expr())
        .arg(" ")
        .arg(personal_info::Column::LastName.into_simple_expr());
    Condition::any()
        .add(lower_like(personal_info::Column::FirstName, fragment))
        .add(lower_like(personal_info::Column::LastName, fragment))
        .add(lower_like_expr(full_name.into(), fragment))
}

pub fn name_matches(r: &ClientRecord, fragment: &str) -> bool {
    r.personal_info.as_ref().is_some_and(|p| {
        contains_ci(&p.first_name, fragment)
            || contains_ci(&p.last_name, fragment)
            || contains_ci(&format!("{} {}", p.first_name, p.last_name), fragment)
    })
}

pub fn last_name_condition(fragment: &str) -> Condition {
    Condition::all().add(lower_like(personal_info::Column::LastName, fragment))
}

pub fn last_name_matches(r: &ClientRecord, fragment: &str) -> bool {
    r.personal_info.as_ref().is_some_and(|p| contains_ci(&p.last_name, fragment))
}
