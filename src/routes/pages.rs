//! Console pages.
//!
//! Admin sections render placeholder data: the dashboard serves fixed stats and the
//! management lists are empty until their backends exist.

use axum::{response::Html, Json};
use console_auth::{CurrentSession, User};
use serde::Serialize;

const SIGN_IN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Sign in | Admin Console</title>
</head>
<body>
  <main>
    <h1>Admin Console</h1>
    <p>Sign in to manage users, lenders, bookings and disputes.</p>
    <a href="/api/auth/signin">Sign in</a>
  </main>
</body>
</html>
"#;

/// Sections served behind the session gate.
pub const PROTECTED_SECTIONS: [&str; 5] =
    ["/dashboard", "/users", "/lenders", "/bookings", "/disputes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_lenders: u64,
    pub open_bookings: u64,
    pub open_disputes: u64,
}

pub const PLACEHOLDER_STATS: DashboardStats = DashboardStats {
    total_users: 1284,
    active_lenders: 86,
    open_bookings: 342,
    open_disputes: 12,
};

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub user: User,
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize)]
pub struct ListPage<T> {
    pub section: &'static str,
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListPage<T> {
    fn empty(section: &'static str) -> Self {
        Self {
            section,
            items: Vec::new(),
            total: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct LenderRow {
    pub id: String,
    pub name: String,
    pub listings: u32,
    pub verified: bool,
}

#[derive(Debug, Serialize)]
pub struct BookingRow {
    pub id: String,
    pub user_id: String,
    pub lender_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct DisputeRow {
    pub id: String,
    pub booking_id: String,
    pub reason: String,
    pub status: String,
}

pub async fn sign_in_page() -> Html<&'static str> {
    Html(SIGN_IN_PAGE)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn dashboard(session: CurrentSession) -> Json<DashboardPage> {
    Json(DashboardPage {
        user: session.user().cloned().unwrap_or_default(),
        stats: PLACEHOLDER_STATS,
    })
}

pub async fn users() -> Json<ListPage<UserRow>> {
    Json(ListPage::empty("users"))
}

pub async fn lenders() -> Json<ListPage<LenderRow>> {
    Json(ListPage::empty("lenders"))
}

pub async fn bookings() -> Json<ListPage<BookingRow>> {
    Json(ListPage::empty("bookings"))
}

pub async fn disputes() -> Json<ListPage<DisputeRow>> {
    Json(ListPage::empty("disputes"))
}
