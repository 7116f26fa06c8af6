/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - リクエストの認証コンテキスト（AuthCtx）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - AuthCtx
 * - CurrentUser
 */

mod core;
mod types;

pub use types::{AuthCtx, CurrentUser};
