//! 内存后端的更新运算符

use crate::adapter::memory::matcher::{as_f64, lookup, set_path, unset_path, values_equal};
use crate::error::QuickDocResult;
use crate::types::ID_FIELD;
use bson::{Bson, Document};

/// 更新文档是否由运算符组成，否则视为整体替换
pub fn is_operator_update(update: &Document) -> bool {
    update.keys().next().map(|k| k.starts_with('$')).unwrap_or(false)
}

/// 对文档应用更新，返回新文档
///
/// 支持 `$set`、`$unset`、`$inc`、`$setOnInsert`，`$setOnInsert` 只在 upsert 插入时生效。
/// 原文档已有 `_id` 时不允许修改或删除它
pub fn apply_update(
    document: &Document,
    update: &Document,
    inserting: bool,
) -> QuickDocResult<Document> {
    let updated = apply_operators(document, update, inserting)?;
    if let Some(id) = document.get(ID_FIELD) {
        let unchanged = updated.get(ID_FIELD).map(|next| values_equal(next, id)).unwrap_or(false);
        if !unchanged {
            return Err(crate::quick_error!(query, format!("更新不能修改不可变字段 {}", ID_FIELD)));
        }
    }
    Ok(updated)
}

fn apply_operators(
    document: &Document,
    update: &Document,
    inserting: bool,
) -> QuickDocResult<Document> {
    if !is_operator_update(update) {
        let mut replaced = Document::new();
        if let Some(id) = document.get(ID_FIELD) {
            replaced.insert(ID_FIELD, id.clone());
        }
        for (field, value) in update {
            if field.starts_with('$') {
                return Err(crate::quick_error!(query, "替换文档中不能混用更新运算符"));
            }
            replaced.insert(field.clone(), value.clone());
        }
        return Ok(replaced);
    }

    let mut updated = document.clone();
    for (operator, argument) in update {
        let fields = match argument {
            Bson::Document(fields) => fields,
            _ => return Err(crate::quick_error!(query, format!("{} 需要文档参数", operator))),
        };
        match operator.as_str() {
            "$set" => {
                for (path, value) in fields {
                    set_path(&mut updated, path, value.clone())?;
                }
            }
            "$setOnInsert" => {
                if inserting {
                    for (path, value) in fields {
                        set_path(&mut updated, path, value.clone())?;
                    }
                }
            }
            "$unset" => {
                for (path, _) in fields {
                    unset_path(&mut updated, path);
                }
            }
            "$inc" => {
                for (path, delta) in fields {
                    let next = increment(lookup(&updated, path), delta, path)?;
                    set_path(&mut updated, path, next)?;
                }
            }
            other => {
                return Err(crate::quick_error!(query, format!("不支持的更新运算符: {}", other)));
            }
        }
    }
    Ok(updated)
}

fn increment(current: Option<&Bson>, delta: &Bson, path: &str) -> QuickDocResult<Bson> {
    if as_f64(delta).is_none() {
        return Err(crate::quick_error!(query, format!("$inc 的增量必须是数值: {}", path)));
    }
    let current = match current {
        None | Some(Bson::Null) => return Ok(delta.clone()),
        Some(value) => value,
    };

    let next = match (current, delta) {
        (Bson::Int32(a), Bson::Int32(b)) => a
            .checked_add(*b)
            .map(Bson::Int32)
            .unwrap_or(Bson::Int64(*a as i64 + *b as i64)),
        (Bson::Int32(_) | Bson::Int64(_), Bson::Int32(_) | Bson::Int64(_)) => {
            let a = as_i64(current);
            let b = as_i64(delta);
            Bson::Int64(a.saturating_add(b))
        }
        _ => match (as_f64(current), as_f64(delta)) {
            (Some(a), Some(b)) => Bson::Double(a + b),
            _ => {
                return Err(crate::quick_error!(
                    query,
                    format!("无法对非数值字段执行 $inc: {}", path)
                ));
            }
        },
    };
    Ok(next)
}

fn as_i64(value: &Bson) -> i64 {
    match value {
        Bson::Int32(v) => *v as i64,
        Bson::Int64(v) => *v,
        _ => 0,
    }
}

/// 从过滤条件中提取等值字段，作为 upsert 插入的初始文档
pub fn seed_from_filter(filter: &Document) -> QuickDocResult<Document> {
    let mut seed = Document::new();
    for (field, condition) in filter {
        if field.starts_with('$') {
            continue;
        }
        let value = match condition {
            Bson::Document(inner) => match inner.keys().next() {
                Some(key) if key == "$eq" => inner.get("$eq").cloned(),
                Some(key) if key.starts_with('$') => None,
                _ => Some(condition.clone()),
            },
            Bson::RegularExpression(_) => None,
            other => Some(other.clone()),
        };
        if let Some(value) = value {
            set_path(&mut seed, field, value)?;
        }
    }
    Ok(seed)
}
