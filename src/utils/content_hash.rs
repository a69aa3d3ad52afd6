// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sha2::{Digest, Sha256};

/// 多个页面文档拼接时使用的分隔符
pub const DOCUMENT_SEPARATOR: &str = "\n";

/// 按配置顺序拼接餐厅的全部页面文档
pub fn combine_documents(documents: &[String]) -> String {
    documents.join(DOCUMENT_SEPARATOR)
}

/// 计算文档内容的十六进制 SHA-256 摘要
pub fn content_hash(document: &str) -> String {
    hex::encode(Sha256::digest(document.as_bytes()))
}
