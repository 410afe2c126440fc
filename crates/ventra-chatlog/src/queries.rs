// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation log queries: append a turn, read a conversation back.

use std::str::FromStr;

use rusqlite::params;
use rusqlite::types::Type;

use ventra_core::types::{MessageKind, TurnAuthor};
use ventra_core::{ChatTurn, ConversationKey, VentraError};

use crate::database::{Database, map_tr_err};

/// Append one turn to a conversation. Turns are never updated or deleted.
pub async fn append_turn(
    db: &Database,
    key: &ConversationKey,
    turn: &ChatTurn,
) -> Result<(), VentraError> {
    let key = key.clone();
    let turn = turn.clone();
    let metadata = turn
        .metadata
        .as_ref()
        .map(|m| serde_json::to_string(m))
        .transpose()
        .map_err(|e| VentraError::Storage {
            source: Box::new(e),
        })?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO turns (number, bot_id, author, format, message, metadata, sale_id, date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    key.number,
                    key.bot_id,
                    turn.author.code(),
                    turn.format.to_string(),
                    turn.message,
                    metadata,
                    turn.sale_id,
                    turn.date,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Read a full conversation in append order.
pub async fn read_turns(
    db: &Database,
    key: &ConversationKey,
) -> Result<Vec<ChatTurn>, VentraError> {
    let key = key.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT author, format, message, metadata, sale_id, date
                 FROM turns WHERE bot_id = ?1 AND number = ?2
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![key.bot_id, key.number], |row| {
                let author_code: String = row.get(0)?;
                let format_name: String = row.get(1)?;
                let metadata_text: Option<String> = row.get(3)?;
                Ok(ChatTurn {
                    author: TurnAuthor::from_code(&author_code).ok_or_else(|| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            Type::Text,
                            format!("unknown author code {author_code:?}").into(),
                        )
                    })?,
                    format: MessageKind::from_str(&format_name).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
                    })?,
                    message: row.get(2)?,
                    metadata: metadata_text
                        .map(|t| serde_json::from_str(&t))
                        .transpose()
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                        })?,
                    sale_id: row.get(4)?,
                    date: row.get(5)?,
                })
            })?;
            let mut turns = Vec::new();
            for row in rows {
                turns.push(row?);
            }
            Ok(turns)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn conversation() -> ConversationKey {
        ConversationKey::new("5215550001111", "ventra")
    }

    #[tokio::test]
    async fn append_and_read_back_in_order() {
        let (db, _dir) = setup_db().await;
        let key = conversation();

        append_turn(&db, &key, &ChatTurn::bot("hola", 100)).await.unwrap();
        append_turn(&db, &key, &ChatTurn::bot("que tal", 101)).await.unwrap();
        append_turn(
            &db,
            &key,
            &ChatTurn::sale_event("start_sale", "sale-1", 102),
        )
        .await
        .unwrap();

        let turns = read_turns(&db, &key).await.unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].message, "hola");
        assert_eq!(turns[1].message, "que tal");
        assert_eq!(turns[2].author, TurnAuthor::System);
        assert_eq!(turns[2].event(), Some("start_sale"));
        assert_eq!(turns[2].sale_id.as_deref(), Some("sale-1"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn conversations_are_isolated_by_key() {
        let (db, _dir) = setup_db().await;
        let a = conversation();
        let b = ConversationKey::new("5215550002222", "ventra");

        append_turn(&db, &a, &ChatTurn::bot("para a", 100)).await.unwrap();
        append_turn(&db, &b, &ChatTurn::bot("para b", 100)).await.unwrap();

        let turns_a = read_turns(&db, &a).await.unwrap();
        assert_eq!(turns_a.len(), 1);
        assert_eq!(turns_a[0].message, "para a");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_conversation_reads_empty() {
        let (db, _dir) = setup_db().await;
        let turns = read_turns(&db, &conversation()).await.unwrap();
        assert!(turns.is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn metadata_round_trips_as_json() {
        let (db, _dir) = setup_db().await;
        let key = conversation();
        let mut turn = ChatTurn::bot("con metadata", 100);
        turn.metadata = Some(serde_json::json!({"event": "awaiting_confirmation", "n": 2}));
        append_turn(&db, &key, &turn).await.unwrap();

        let turns = read_turns(&db, &key).await.unwrap();
        assert_eq!(turns[0].event(), Some("awaiting_confirmation"));
        assert_eq!(turns[0].metadata.as_ref().unwrap()["n"], 2);

        db.close().await.unwrap();
    }
}
