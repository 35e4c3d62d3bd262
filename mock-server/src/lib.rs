use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const PAGE_BASE_URL: &str = "https://telegra.ph";
const DEFAULT_LIST_LIMIT: usize = 50;
const DESCRIPTION_LEN: usize = 100;

type Params = Map<String, Value>;

#[derive(Clone, Debug)]
pub struct Account {
    pub id: Uuid,
    pub short_name: String,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct StoredPage {
    pub owner: Uuid,
    pub path: String,
    pub title: String,
    pub description: String,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    pub content: Value,
    pub views: u64,
}

#[derive(Default, Debug)]
pub struct Store {
    accounts: HashMap<Uuid, Account>,
    tokens: HashMap<String, Uuid>,
    pages: HashMap<String, StoredPage>,
    /// Page paths in creation order.
    order: Vec<String>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/{method}", post(dispatch))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn dispatch(
    State(db): State<Db>,
    Path(method): Path<String>,
    Json(params): Json<Params>,
) -> Json<Value> {
    let mut store = db.write().await;
    let outcome = match method.as_str() {
        "createAccount" => store.create_account(&params),
        "editAccountInfo" => store.edit_account_info(&params),
        "getAccountInfo" => store.get_account_info(&params),
        "revokeAccessToken" => store.revoke_access_token(&params),
        "createPage" => store.create_page(&params),
        "editPage" => store.edit_page(&params),
        "getPage" => store.get_page(&params),
        "getPageList" => store.get_page_list(&params),
        "getViews" => store.get_views(&params),
        _ => Err("METHOD_NOT_FOUND"),
    };
    debug!(%method, ok = outcome.is_ok(), "handled call");
    Json(match outcome {
        Ok(result) => json!({"ok": true, "result": result}),
        Err(error) => json!({"ok": false, "error": error}),
    })
}

type Outcome = Result<Value, &'static str>;

impl Store {
    fn create_account(&mut self, params: &Params) -> Outcome {
        let short_name = non_empty(params, "short_name").ok_or("SHORT_NAME_REQUIRED")?;
        let account = Account {
            id: Uuid::new_v4(),
            short_name,
            author_name: string(params, "author_name"),
            author_url: string(params, "author_url"),
        };
        let token = self.issue_token(account.id);
        let mut result = account_json(&account);
        result.insert("access_token".to_string(), json!(token));
        result.insert("auth_url".to_string(), json!(auth_url(&token)));
        result.insert("page_count".to_string(), json!(0));
        self.accounts.insert(account.id, account);
        Ok(Value::Object(result))
    }

    fn edit_account_info(&mut self, params: &Params) -> Outcome {
        let id = self.authenticate(params)?;
        let account = self.accounts.get_mut(&id).ok_or("ACCESS_TOKEN_INVALID")?;
        if let Some(short_name) = non_empty(params, "short_name") {
            account.short_name = short_name;
        }
        if let Some(author_name) = string(params, "author_name") {
            account.author_name = Some(author_name);
        }
        if let Some(author_url) = string(params, "author_url") {
            account.author_url = Some(author_url);
        }
        Ok(Value::Object(account_json(account)))
    }

    fn get_account_info(&self, params: &Params) -> Outcome {
        let id = self.authenticate(params)?;
        let account = self.accounts.get(&id).ok_or("ACCESS_TOKEN_INVALID")?;
        let fields: Vec<String> = match params.get("fields") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|f| f.as_str().map(str::to_string))
                .collect(),
            _ => vec![
                "short_name".to_string(),
                "author_name".to_string(),
                "author_url".to_string(),
            ],
        };

        let mut all = account_json(account);
        all.insert("page_count".to_string(), json!(self.pages_of(id).count()));
        let token = self.tokens.iter().find(|(_, owner)| **owner == id).map(|(t, _)| t.clone());
        if let Some(token) = token {
            all.insert("auth_url".to_string(), json!(auth_url(&token)));
        }

        let result: Params = all
            .into_iter()
            .filter(|(key, _)| fields.iter().any(|f| f == key))
            .collect();
        Ok(Value::Object(result))
    }

    fn revoke_access_token(&mut self, params: &Params) -> Outcome {
        let id = self.authenticate(params)?;
        self.tokens.retain(|_, owner| *owner != id);
        let token = self.issue_token(id);
        Ok(json!({"access_token": token, "auth_url": auth_url(&token)}))
    }

    fn create_page(&mut self, params: &Params) -> Outcome {
        let id = self.authenticate(params)?;
        let title = non_empty(params, "title").ok_or("TITLE_REQUIRED")?;
        let content = content(params)?;
        let account = self.accounts.get(&id).ok_or("ACCESS_TOKEN_INVALID")?;

        let path = format!("{}-{}", slug(&title), self.order.len() + 1);
        let page = StoredPage {
            owner: id,
            path: path.clone(),
            description: describe(&content),
            title,
            author_name: string(params, "author_name").or_else(|| account.author_name.clone()),
            author_url: string(params, "author_url").or_else(|| account.author_url.clone()),
            content,
            views: 0,
        };
        let result = page_json(&page, Some(id), flag(params, "return_content"));
        self.pages.insert(path.clone(), page);
        self.order.push(path);
        Ok(result)
    }

    fn edit_page(&mut self, params: &Params) -> Outcome {
        let id = self.authenticate(params)?;
        let path = string(params, "path").ok_or("PAGE_NOT_FOUND")?;
        let title = non_empty(params, "title").ok_or("TITLE_REQUIRED")?;
        let content = content(params)?;
        let page = self.pages.get_mut(&path).ok_or("PAGE_NOT_FOUND")?;
        if page.owner != id {
            return Err("PAGE_ACCESS_DENIED");
        }

        page.title = title;
        page.description = describe(&content);
        page.content = content;
        if let Some(author_name) = string(params, "author_name") {
            page.author_name = Some(author_name);
        }
        if let Some(author_url) = string(params, "author_url") {
            page.author_url = Some(author_url);
        }
        Ok(page_json(page, Some(id), flag(params, "return_content")))
    }

    fn get_page(&mut self, params: &Params) -> Outcome {
        let caller = self.authenticate(params).ok();
        let path = string(params, "path").ok_or("PAGE_NOT_FOUND")?;
        let page = self.pages.get_mut(&path).ok_or("PAGE_NOT_FOUND")?;
        page.views += 1;
        Ok(page_json(page, caller, flag(params, "return_content")))
    }

    fn get_page_list(&self, params: &Params) -> Outcome {
        let id = self.authenticate(params)?;
        let offset = params.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize;
        let limit = params
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_LIST_LIMIT, |l| l as usize);

        let owned: Vec<&StoredPage> = self.pages_of(id).collect();
        let pages: Vec<Value> = owned
            .iter()
            .skip(offset)
            .take(limit)
            .map(|page| page_json(page, Some(id), false))
            .collect();
        Ok(json!({"total_count": owned.len(), "pages": pages}))
    }

    /// Views are not bucketed by time. The window is checked for gaps
    /// (`day` needs `month`, and so on) and then ignored, so any valid
    /// window reports the page's total.
    fn get_views(&self, params: &Params) -> Outcome {
        let path = string(params, "path").ok_or("PAGE_NOT_FOUND")?;
        let has = |key: &str| params.get(key).is_some_and(|v| !v.is_null());
        let gap = (has("month") && !has("year"))
            || (has("day") && !has("month"))
            || (has("hour") && !has("day"));
        if gap {
            return Err("INVALID_DATE");
        }
        let page = self.pages.get(&path).ok_or("PAGE_NOT_FOUND")?;
        Ok(json!({"views": page.views}))
    }

    fn authenticate(&self, params: &Params) -> Result<Uuid, &'static str> {
        params
            .get("access_token")
            .and_then(Value::as_str)
            .and_then(|token| self.tokens.get(token))
            .copied()
            .ok_or("ACCESS_TOKEN_INVALID")
    }

    fn issue_token(&mut self, id: Uuid) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), id);
        token
    }

    /// Pages owned by `id`, most recent first.
    fn pages_of(&self, id: Uuid) -> impl Iterator<Item = &StoredPage> + '_ {
        self.order
            .iter()
            .rev()
            .filter_map(|path| self.pages.get(path))
            .filter(move |page| page.owner == id)
    }
}

fn string(params: &Params, key: &str) -> Option<String> {
    params.get(key).and_then(Value::as_str).map(str::to_string)
}

fn non_empty(params: &Params, key: &str) -> Option<String> {
    string(params, key).filter(|s| !s.trim().is_empty())
}

fn flag(params: &Params, key: &str) -> bool {
    params.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn content(params: &Params) -> Result<Value, &'static str> {
    match params.get("content") {
        Some(Value::Array(nodes)) if !nodes.is_empty() => Ok(Value::Array(nodes.clone())),
        _ => Err("CONTENT_REQUIRED"),
    }
}

fn auth_url(token: &str) -> String {
    format!("https://edit.telegra.ph/auth/{token}")
}

fn account_json(account: &Account) -> Params {
    let mut map = Params::new();
    map.insert("short_name".to_string(), json!(account.short_name));
    map.insert("author_name".to_string(), json!(account.author_name.clone().unwrap_or_default()));
    map.insert("author_url".to_string(), json!(account.author_url.clone().unwrap_or_default()));
    map
}

fn page_json(page: &StoredPage, caller: Option<Uuid>, with_content: bool) -> Value {
    let mut map = Params::new();
    map.insert("path".to_string(), json!(page.path));
    map.insert("url".to_string(), json!(format!("{PAGE_BASE_URL}/{}", page.path)));
    map.insert("title".to_string(), json!(page.title));
    map.insert("description".to_string(), json!(page.description));
    if let Some(author_name) = &page.author_name {
        map.insert("author_name".to_string(), json!(author_name));
    }
    if let Some(author_url) = &page.author_url {
        map.insert("author_url".to_string(), json!(author_url));
    }
    map.insert("views".to_string(), json!(page.views));
    if caller == Some(page.owner) {
        map.insert("can_edit".to_string(), json!(true));
    }
    if with_content {
        map.insert("content".to_string(), page.content.clone());
    }
    Value::Object(map)
}

/// Path prefix derived from a page title.
pub fn slug(title: &str) -> String {
    let words: Vec<String> = title
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        "Untitled".to_string()
    } else {
        words.join("-")
    }
}

/// First characters of the page's text, used as its description.
pub fn describe(content: &Value) -> String {
    let mut text = String::new();
    collect_text(content, &mut text);
    let words: Vec<&str> = text.split_whitespace().collect();
    words.join(" ").chars().take(DESCRIPTION_LEN).collect()
}

fn collect_text(node: &Value, out: &mut String) {
    match node {
        Value::String(s) => out.push_str(s),
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, out)),
        Value::Object(map) => {
            if let Some(children) = map.get("children") {
                collect_text(children, out);
            }
            out.push(' ');
        }
        _ => {}
    }
}
