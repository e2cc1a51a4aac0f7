use crate::chat::ChatClient;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub chat: ChatClient,
}
