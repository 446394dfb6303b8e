use crate::error::StorageExt;
use crate::{LegacyGiven, LegacyUser, SourceDb};
use authconv_core::Result;
use rusqlite::types::{Type, ValueRef};
use rusqlite::Row;

const SELECT_USERS: &str = "SELECT ss14_userid, discord_id, access_token, refresh_token FROM users";
const SELECT_GIVEN: &str = "SELECT discord_id, is_given FROM given WHERE is_given IN (0, 1)";

impl SourceDb {
    /// All legacy users in storage order.
    pub fn users(&self) -> Result<Vec<LegacyUser>> {
        let mut stmt = self.conn.prepare(SELECT_USERS).storage()?;
        let rows = stmt
            .query_map([], |r| {
                Ok(LegacyUser {
                    ss14_userid: text(r, 0, "ss14_userid")?,
                    discord_id: text(r, 1, "discord_id")?,
                    access_token: text(r, 2, "access_token")?,
                    refresh_token: text(r, 3, "refresh_token")?,
                })
            })
            .storage()?;
        rows.collect::<rusqlite::Result<Vec<_>>>().storage()
    }

    /// Legacy `given` rows whose flag is 0 or 1; anything else is never read.
    pub fn given(&self) -> Result<Vec<LegacyGiven>> {
        let mut stmt = self.conn.prepare(SELECT_GIVEN).storage()?;
        let rows = stmt
            .query_map([], |r| Ok(LegacyGiven { discord_id: text(r, 0, "discord_id")?, is_given: r.get(1)? }))
            .storage()?;
        rows.collect::<rusqlite::Result<Vec<_>>>().storage()
    }
}

// Legacy ids were sometimes stored with INTEGER affinity; read them back as their decimal text.
// Text must be valid UTF-8: a lossy decode would alter tokens and could merge distinct ids.
fn text(row: &Row, idx: usize, column: &str) -> rusqlite::Result<String> {
    match row.get_ref(idx)? {
        ValueRef::Text(b) => std::str::from_utf8(b)
            .map(str::to_owned)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        ValueRef::Integer(i) => Ok(i.to_string()),
        other => Err(rusqlite::Error::InvalidColumnType(idx, column.to_string(), other.data_type())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authconv_core::ConvertError;
    use rusqlite::Connection;

    fn source(sql: &str) -> SourceDb {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (ss14_userid TEXT, discord_id TEXT, access_token TEXT, refresh_token TEXT);
             CREATE TABLE given (discord_id TEXT, is_given INTEGER);",
        )
        .unwrap();
        conn.execute_batch(sql).unwrap();
        SourceDb::from_connection(conn)
    }

    #[test]
    fn reads_users_in_storage_order() {
        let src = source(
            "INSERT INTO users VALUES ('ss14-B','discordB','acc2','ref2');
             INSERT INTO users VALUES ('ss14-A','discordA','acc1','ref1');",
        );
        let users = src.users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].ss14_userid, "ss14-B");
        assert_eq!(users[1].access_token, "acc1");
    }

    #[test]
    fn given_skips_out_of_domain_flags() {
        let src = source(
            "INSERT INTO given VALUES ('a', 0);
             INSERT INTO given VALUES ('b', 2);
             INSERT INTO given VALUES ('c', 1);
             INSERT INTO given VALUES ('d', -1);",
        );
        let given = src.given().unwrap();
        let ids: Vec<_> = given.iter().map(|g| (g.discord_id.as_str(), g.is_given)).collect();
        assert_eq!(ids, vec![("a", 0), ("c", 1)]);
    }

    #[test]
    fn integer_ids_are_read_as_text() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (ss14_userid TEXT, discord_id INTEGER, access_token TEXT, refresh_token TEXT);
             CREATE TABLE given (discord_id INTEGER, is_given INTEGER);
             INSERT INTO users VALUES ('ss14-A', 123456789012345678, 'acc', 'ref');
             INSERT INTO given VALUES (123456789012345678, 1);",
        )
        .unwrap();
        let src = SourceDb::from_connection(conn);
        assert_eq!(src.users().unwrap()[0].discord_id, "123456789012345678");
        assert_eq!(src.given().unwrap()[0].discord_id, "123456789012345678");
    }

    #[test]
    fn null_token_is_an_error() {
        let src = source("INSERT INTO users VALUES ('ss14-A', 'discordA', NULL, 'ref');");
        assert!(matches!(src.users(), Err(ConvertError::Storage(_))));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let src = source("INSERT INTO users VALUES ('ss14-A', 'd1', CAST(X'61FF62' AS TEXT), 'r');");
        assert!(matches!(src.users(), Err(ConvertError::Storage(_))));

        let src = source("INSERT INTO given VALUES (CAST(X'64FE' AS TEXT), 1);");
        assert!(matches!(src.given(), Err(ConvertError::Storage(_))));
    }

    #[test]
    fn missing_legacy_table_is_an_error() {
        let src = SourceDb::from_connection(Connection::open_in_memory().unwrap());
        match src.users() {
            Err(ConvertError::Storage(msg)) => assert!(msg.contains("no such table: users"), "{msg}"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
