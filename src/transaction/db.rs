//! Database operations for transactions.
//!
//! Every query is scoped to the owning user, so a user can never read or
//! change another user's transactions.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    category::CategoryName,
    transaction::{
        NewTransaction, Transaction, TransactionFilter, TransactionId, TransactionUpdate,
    },
};

/// Create a transaction owned by `user_id` and return it with its generated ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    user_id: UserID,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, kind, category, amount, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, kind, category, amount, date",
        )?
        .query_row(
            (
                user_id.as_i64(),
                transaction.kind,
                transaction.category.as_ref(),
                transaction.amount,
                transaction.date,
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the transaction with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, category, amount, date FROM \"transaction\"
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the transactions owned by `user_id` that match `filter`, newest first.
///
/// Transactions on the same date are ordered by descending ID so that the
/// order is stable.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, category, amount, date FROM \"transaction\"
             WHERE user_id = ?1
                AND (?2 IS NULL OR date >= ?2)
                AND (?3 IS NULL OR date <= ?3)
                AND (?4 IS NULL OR kind = ?4)
             ORDER BY date DESC, id DESC",
        )?
        .query_map(
            (user_id.as_i64(), filter.from, filter.to, filter.kind),
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Apply `update` to the transaction with `id` owned by `user_id` and return
/// the updated transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    update: &TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "UPDATE \"transaction\" SET
                kind = COALESCE(?1, kind),
                category = COALESCE(?2, category),
                amount = COALESCE(?3, amount),
                date = COALESCE(?4, date)
             WHERE id = ?5 AND user_id = ?6
             RETURNING id, user_id, kind, category, amount, date",
        )?
        .query_row(
            (
                update.kind,
                update.category.as_ref().map(|category| category.as_ref()),
                update.amount,
                update.date,
                id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete the transaction with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// The user table must exist before this table is created.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            category TEXT NOT NULL CHECK (length(trim(category)) > 0),
            amount REAL NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )
}

/// Map a database row to a [Transaction].
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let kind = row.get(2)?;
    let raw_category: String = row.get(3)?;
    let amount = row.get(4)?;
    let date = row.get(5)?;

    Ok(Transaction {
        id,
        user_id,
        kind,
        category: CategoryName::new_unchecked(&raw_category),
        amount,
        date,
    })
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash, UserID,
        auth::create_user,
        category::CategoryName,
        db::initialize,
        transaction::{
            NewTransaction, TransactionFilter, TransactionKind, TransactionUpdate,
            create_transaction, delete_transaction, get_transaction, list_transactions,
            update_transaction,
        },
    };

    fn get_test_connection() -> (Connection, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let owner = create_user(
            "Owner",
            &"owner@example.com".parse().unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let other = create_user(
            "Other",
            &"other@example.com".parse().unwrap(),
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();

        (connection, owner.id, other.id)
    }

    fn expense(category: &str, amount: f64, date: time::Date) -> NewTransaction {
        NewTransaction::new(
            TransactionKind::Expense,
            CategoryName::new_unchecked(category),
            amount,
            date,
        )
        .unwrap()
    }

    #[test]
    fn create_succeeds() {
        let (connection, user_id, _) = get_test_connection();

        let transaction = create_transaction(
            user_id,
            expense("Zomato", 12.3, date!(2025 - 10 - 05)),
            &connection,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.user_id, user_id);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.category.as_ref(), "Zomato");
        assert_eq!(transaction.amount, 12.3);
        assert_eq!(transaction.date, date!(2025 - 10 - 05));
    }

    #[test]
    fn get_is_scoped_to_owner() {
        let (connection, owner, other) = get_test_connection();
        let transaction = create_transaction(
            owner,
            expense("Rent", 1200.0, date!(2025 - 01 - 01)),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_transaction(transaction.id, owner, &connection),
            Ok(transaction.clone())
        );
        assert_eq!(
            get_transaction(transaction.id, other, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn list_is_newest_first_and_scoped_to_owner() {
        let (connection, owner, other) = get_test_connection();
        let first = create_transaction(
            owner,
            expense("a", 1.0, date!(2025 - 01 - 10)),
            &connection,
        )
        .unwrap();
        let second = create_transaction(
            owner,
            expense("b", 2.0, date!(2025 - 01 - 20)),
            &connection,
        )
        .unwrap();
        let third = create_transaction(
            owner,
            expense("c", 3.0, date!(2025 - 01 - 20)),
            &connection,
        )
        .unwrap();
        create_transaction(
            other,
            expense("d", 4.0, date!(2025 - 01 - 15)),
            &connection,
        )
        .unwrap();

        let transactions =
            list_transactions(owner, &TransactionFilter::default(), &connection).unwrap();

        assert_eq!(transactions, vec![third, second, first]);
    }

    #[test]
    fn list_filters_by_inclusive_date_range_and_kind() {
        let (connection, owner, _) = get_test_connection();
        for (kind, day) in [
            (TransactionKind::Expense, date!(2025 - 01 - 31)),
            (TransactionKind::Expense, date!(2025 - 02 - 01)),
            (TransactionKind::Income, date!(2025 - 02 - 14)),
            (TransactionKind::Expense, date!(2025 - 02 - 28)),
            (TransactionKind::Expense, date!(2025 - 03 - 01)),
        ] {
            let transaction =
                NewTransaction::new(kind, CategoryName::new_unchecked("x"), 1.0, day).unwrap();
            create_transaction(owner, transaction, &connection).unwrap();
        }
        let filter = TransactionFilter {
            from: Some(date!(2025 - 02 - 01)),
            to: Some(date!(2025 - 02 - 28)),
            kind: Some(TransactionKind::Expense),
        };

        let dates: Vec<_> = list_transactions(owner, &filter, &connection)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.date)
            .collect();

        assert_eq!(dates, vec![date!(2025 - 02 - 28), date!(2025 - 02 - 01)]);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let (connection, owner, _) = get_test_connection();
        let transaction = create_transaction(
            owner,
            expense("Zomato", 10.0, date!(2025 - 01 - 10)),
            &connection,
        )
        .unwrap();
        let update = TransactionUpdate {
            amount: Some(15.0),
            category: Some(CategoryName::new_unchecked("Swiggy")),
            ..Default::default()
        };

        let updated = update_transaction(transaction.id, owner, &update, &connection).unwrap();

        assert_eq!(updated.amount, 15.0);
        assert_eq!(updated.category.as_ref(), "Swiggy");
        assert_eq!(updated.kind, transaction.kind);
        assert_eq!(updated.date, transaction.date);
    }

    #[test]
    fn update_fails_for_other_user() {
        let (connection, owner, other) = get_test_connection();
        let transaction = create_transaction(
            owner,
            expense("Zomato", 10.0, date!(2025 - 01 - 10)),
            &connection,
        )
        .unwrap();

        let result = update_transaction(
            transaction.id,
            other,
            &TransactionUpdate::default(),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_succeeds_for_owner() {
        let (connection, owner, _) = get_test_connection();
        let transaction = create_transaction(
            owner,
            expense("Zomato", 10.0, date!(2025 - 01 - 10)),
            &connection,
        )
        .unwrap();

        delete_transaction(transaction.id, owner, &connection).unwrap();

        assert_eq!(
            get_transaction(transaction.id, owner, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_fails_for_other_user() {
        let (connection, owner, other) = get_test_connection();
        let transaction = create_transaction(
            owner,
            expense("Zomato", 10.0, date!(2025 - 01 - 10)),
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_transaction(transaction.id, other, &connection),
            Err(Error::DeleteMissingTransaction)
        );
        assert!(get_transaction(transaction.id, owner, &connection).is_ok());
    }

    #[test]
    fn table_rejects_non_positive_amount() {
        let (connection, owner, _) = get_test_connection();

        let result = connection.execute(
            "INSERT INTO \"transaction\" (user_id, kind, category, amount, date)
             VALUES (?1, 'expense', 'x', 0, '2025-01-01')",
            [owner.as_i64()],
        );

        assert!(result.is_err());
    }
}
