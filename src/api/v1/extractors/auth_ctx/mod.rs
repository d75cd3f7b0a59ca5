/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - 認証ゲートが付与した identity ヘッダ (x-user-id / x-user-email) を AuthCtx として handler に渡す
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use types::AuthCtx;
