//! Accounts and sessions: the admin login plus the member actions used by
//! the public site.

use common::protocol::{
    ChangePasswordRequest, LoginRequest, MemberForgotRequest, MemberRegisterRequest, ProfileReadRequest,
    ProfileUpdateRequest, TokenRequest,
};
use log::info;
use rusqlite::Connection;
use serde_json::{json, Map, Value};

use crate::db::{self, StubState, User, ROLE_ADMIN, ROLE_MEMBER};

/// Profile keys owned by the account itself, never written from a profile body.
const RESERVED_PROFILE_KEYS: [&str; 3] = ["username", "email", "role"];

/// Resolves a session token. Messages mention the token so clients can tell
/// a session problem from any other refusal.
pub fn authorize(conn: &Connection, token: &str, admin_only: bool) -> Result<User, String> {
    let user = db::session_user(conn, token)?.ok_or("Invalid or expired token")?;
    if admin_only && !user.is_admin() {
        return Err("Unauthorized: admin role required".to_string());
    }
    Ok(user)
}

fn authenticate(conn: &Connection, request: &LoginRequest) -> Result<User, String> {
    let user = db::find_user(conn, request.username.trim())?;
    match user {
        Some(user) if user.check_password(&request.password) => Ok(user),
        _ => Err("Invalid username or password".to_string()),
    }
}

fn session_reply(conn: &Connection, user: &User) -> Result<Value, String> {
    let token = db::open_session(conn, &user.username)?;
    Ok(json!({ "token": token, "role": user.role, "username": user.username }))
}

pub fn login(state: &StubState, request: LoginRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    let user = authenticate(&conn, &request)?;
    if !user.is_admin() {
        return Err("This account cannot use the admin".to_string());
    }
    info!("Admin '{}' logged in", user.username);
    session_reply(&conn, &user)
}

pub fn member_login(state: &StubState, request: LoginRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    let user = authenticate(&conn, &request)?;
    session_reply(&conn, &user)
}

pub fn member_register(state: &StubState, request: MemberRegisterRequest) -> Result<Value, String> {
    let username = request.username.trim();
    let email = request.email.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err("Username and password are required".to_string());
    }
    if !email.is_empty() && !email.contains('@') {
        return Err("Invalid email address".to_string());
    }

    let role = if request.is_admin == Some(true) {
        if request.admin_code.as_deref() != Some(state.config.admin_code.as_str()) {
            return Err("Invalid admin code".to_string());
        }
        ROLE_ADMIN
    } else {
        ROLE_MEMBER
    };

    let conn = state.conn()?;
    if db::find_user(&conn, username)?.is_some() {
        return Err(format!("The username '{username}' is already taken"));
    }
    db::create_user(&conn, username, email, &request.password, role)?;
    info!("Registered {role} '{username}'");

    let user = db::find_user(&conn, username)?.ok_or("Registration failed")?;
    session_reply(&conn, &user)
}

/// Always answers the same way so the reply does not reveal which accounts exist.
pub fn member_forgot(state: &StubState, request: MemberForgotRequest) -> Result<Value, String> {
    let username = request.username.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let email = request.email.as_deref().map(str::trim).filter(|v| !v.is_empty());
    if username.is_none() && email.is_none() {
        return Err("Enter a username or an email".to_string());
    }

    let conn = state.conn()?;
    let account = db::list_users(&conn)?.into_iter().find(|user| {
        username.is_some_and(|name| name == user.username)
            || email.is_some_and(|mail| mail.eq_ignore_ascii_case(&user.email))
    });
    if let Some(user) = account {
        // No mail delivery in the stub.
        info!("Password reset requested for '{}'", user.username);
    }
    Ok(json!({ "message": "If the account exists, reset instructions have been sent" }))
}

pub fn change_password(state: &StubState, request: ChangePasswordRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    let user = authorize(&conn, &request.token, false)?;
    if !user.check_password(&request.current) {
        return Err("The current password is wrong".to_string());
    }
    if request.new_password.is_empty() {
        return Err("The new password is empty".to_string());
    }
    db::set_password(&conn, &user.username, &request.new_password)?;
    Ok(json!({}))
}

fn may_access(caller: &User, username: &str) -> Result<(), String> {
    if caller.username == username || caller.is_admin() {
        Ok(())
    } else {
        Err("Unauthorized: not your profile".to_string())
    }
}

pub fn profile_read(state: &StubState, request: ProfileReadRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    let caller = authorize(&conn, &request.token, false)?;
    may_access(&caller, &request.username)?;

    let user = db::find_user(&conn, &request.username)?.ok_or("Unknown user")?;
    let stored = db::read_profile(&conn, &user.username)?.unwrap_or_default();
    let mut profile: Map<String, Value> = serde_json::from_str(&stored).unwrap_or_default();
    profile.insert("username".into(), json!(user.username));
    profile.insert("email".into(), json!(user.email));
    profile.insert("role".into(), json!(user.role));
    Ok(json!({ "profile": profile }))
}

pub fn profile_update(state: &StubState, request: ProfileUpdateRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    let caller = authorize(&conn, &request.token, false)?;
    may_access(&caller, &request.username)?;
    db::find_user(&conn, &request.username)?.ok_or("Unknown user")?;

    let Value::Object(mut profile) = request.profile else {
        return Err("The profile must be a JSON object".to_string());
    };
    for key in RESERVED_PROFILE_KEYS {
        profile.remove(key);
    }
    let profile = serde_json::to_string(&profile).map_err(|e| e.to_string())?;
    db::write_profile(&conn, &request.username, &profile)?;
    Ok(json!({}))
}

pub fn members_list(state: &StubState, request: TokenRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    authorize(&conn, &request.token, true)?;
    let users: Vec<Value> = db::list_users(&conn)?
        .into_iter()
        .map(|user| {
            json!({
                "username": user.username,
                "email": user.email,
                "role": user.role,
                "createdAt": user.created_at,
            })
        })
        .collect();
    Ok(json!({ "users": users }))
}
