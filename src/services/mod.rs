/*
 * Responsibility
 * - 外部サービスとの境界 (identity: Firebase ID トークン検証)
 */
pub mod identity;
