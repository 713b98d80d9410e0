use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Local;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::{self, RequireLogin, Session, INVALID_CREDENTIALS};
use crate::config::Config;
use crate::db::{self, Db};
use crate::error::Result;
use crate::models::{order_entries, NewCategory, NewEntry};
use crate::state::AppState;
use crate::views::Page;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn page<'a>(config: &'a Config, session: &mut Session) -> Result<Page<'a>> {
    Ok(Page {
        config,
        logged_in: session.is_logged_in(),
        flashes: session.take_flashes()?,
    })
}

pub async fn show_entries(
    State(state): State<AppState>,
    mut session: Session,
    db: Db,
) -> Result<Html<String>> {
    let entries = order_entries(db::get_all_entries(&db).await?, state.config.latest_first);
    let page = page(&state.config, &mut session)?;
    Ok(Html(state.renderer.entries(&page, &entries, None)))
}

pub async fn view_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    mut session: Session,
    db: Db,
) -> Result<Html<String>> {
    let entries = order_entries(
        db::entries_in_category(&db, &category).await?,
        state.config.latest_first_in_categories,
    );
    let page = page(&state.config, &mut session)?;
    Ok(Html(state.renderer.entries(&page, &entries, Some(&category))))
}

pub async fn add_entry(
    State(state): State<AppState>,
    _admin: RequireLogin,
    mut session: Session,
    db: Db,
    Form(entry): Form<NewEntry>,
) -> Result<Redirect> {
    let posted = state.config.timestamp(&Local::now())?;
    info!("Posting entry {:?} in {:?}", entry.title, entry.category);
    db::insert_entry(&db, entry, posted).await?;
    session.flash("New entry was successfully posted.")?;
    Ok(Redirect::to("/"))
}

pub async fn add_category(
    _admin: RequireLogin,
    mut session: Session,
    db: Db,
    Form(category): Form<NewCategory>,
) -> Result<Redirect> {
    info!("Adding category {:?}", category.category);
    db::insert_category(&db, category).await?;
    session.flash("New category was successfully added.")?;
    Ok(Redirect::to("/new_post"))
}

pub async fn delete_entry(
    _admin: RequireLogin,
    Path(entry_id): Path<i64>,
    mut session: Session,
    db: Db,
) -> Result<Redirect> {
    let removed = db::delete_entry(&db, entry_id).await?;
    if removed == 0 {
        debug!("No entry with id {entry_id} to delete");
    } else {
        info!("Deleted entry {entry_id}");
    }
    session.flash("Entry was successfully deleted.")?;
    Ok(Redirect::to("/"))
}

pub async fn login_form(State(state): State<AppState>, mut session: Session) -> Result<Html<String>> {
    let page = page(&state.config, &mut session)?;
    Ok(Html(state.renderer.login(&page, None)))
}

pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(credentials): Form<Credentials>,
) -> Result<Response> {
    if auth::login(&mut session, &state.config, &credentials.username, &credentials.password)? {
        session.flash("You are now logged in.")?;
        return Ok(Redirect::to("/").into_response());
    }

    let page = page(&state.config, &mut session)?;
    Ok(Html(state.renderer.login(&page, Some(INVALID_CREDENTIALS))).into_response())
}

pub async fn logout(mut session: Session) -> Result<Redirect> {
    auth::logout(&mut session)?;
    session.flash("You were logged out.")?;
    Ok(Redirect::to("/"))
}

pub async fn new_post(
    State(state): State<AppState>,
    _admin: RequireLogin,
    mut session: Session,
    db: Db,
) -> Result<Html<String>> {
    let categories = db::get_all_categories(&db).await?;
    let page = page(&state.config, &mut session)?;
    Ok(Html(state.renderer.new_post(&page, &categories)))
}

pub async fn new_category(
    State(state): State<AppState>,
    _admin: RequireLogin,
    mut session: Session,
) -> Result<Html<String>> {
    let page = page(&state.config, &mut session)?;
    Ok(Html(state.renderer.new_category(&page)))
}

pub async fn favicon() -> Redirect {
    Redirect::to("/static/favicon.ico")
}
