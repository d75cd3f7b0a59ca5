/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - verifier: ID トークン検証 (差し替え可能な trait object)
 *   - protected_routes: 認証ゲートを掛けるパス prefix
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::middleware::auth::ProtectedRoutes;
use crate::services::identity::IdentityVerifier;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub protected_routes: Arc<ProtectedRoutes>,
}

impl AppState {
    pub fn new(verifier: Arc<dyn IdentityVerifier>, protected_routes: ProtectedRoutes) -> Self {
        Self {
            verifier,
            protected_routes: Arc::new(protected_routes),
        }
    }
}
