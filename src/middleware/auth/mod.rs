/*
 * Responsibility
 * - 認証ゲート (gate) と保護対象パス (protected) の公開インターフェース
 */
pub mod gate;
mod protected;

pub use gate::{USER_EMAIL_HEADER, USER_ID_HEADER};
pub use protected::ProtectedRoutes;
