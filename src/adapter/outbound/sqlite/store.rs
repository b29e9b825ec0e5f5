//! SQLite store implementation.
//!
//! One pool-backed type implements every outbound store port. Opportunity
//! inserts run in an immediate transaction so the existence check, the
//! opportunity row and its sides row commit or roll back together.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;
use tracing::{debug, warn};

use crate::adapter::outbound::sqlite::database::connection::{configure_sqlite_connection, DbPool};
use crate::adapter::outbound::sqlite::database::model::{
    BetSidesRow, MarketMatchRow, MarketRow, NewOpportunityRow, NewOptionMatchRow,
    OpportunityRow, OptionMatchRow, OptionRow, SnapshotRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    arbitrage_bet_sides, arbitrage_opportunities, market_matches, markets, option_matches,
    options, price_snapshots,
};
use crate::domain::{
    ArbitrageFlag, ArbitrageId, ArbitrageOpportunity, ContractPair, Market, MarketId,
    MarketMatch, MarketOption, MarketStatus, NewOpportunity, OptionId, OptionMatch, OptionQuote,
    Platform, PriceSnapshot, RecordedSides,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::{
    CatalogStore, InsertOutcome, MaintenanceStore, OpportunityStore, PriceSource,
};

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    #[diesel(column_name = "id")]
    id: i32,
}

/// SQLite-backed store for the catalog, prices and the opportunity ledger.
#[derive(Clone)]
pub struct SqliteStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Pooled connection with the busy timeout applied, so readers and
    /// writers wait on a locked database instead of failing.
    fn conn(&self) -> Result<Conn> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        if let Err(e) = configure_sqlite_connection(&mut conn) {
            warn!(error = %e, "Failed to configure SQLite connection");
        }
        Ok(conn)
    }

    fn pair_filter(
        pair: &ContractPair,
    ) -> Box<
        dyn BoxableExpression<
            arbitrage_opportunities::table,
            diesel::sqlite::Sqlite,
            SqlType = diesel::sql_types::Bool,
        >,
    > {
        let low = pair.low().to_string();
        let high = pair.high().to_string();
        Box::new(
            arbitrage_opportunities::contract_id_1
                .eq(low.clone())
                .and(arbitrage_opportunities::contract_id_2.eq(high.clone()))
                .or(arbitrage_opportunities::contract_id_1
                    .eq(high)
                    .and(arbitrage_opportunities::contract_id_2.eq(low))),
        )
    }

    fn load_sides(conn: &mut SqliteConnection, id: i32) -> Result<Option<RecordedSides>> {
        let row: Option<BetSidesRow> = arbitrage_bet_sides::table
            .find(id)
            .select(BetSidesRow::as_select())
            .first(conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(BetSidesRow::into_domain).transpose()
    }

    fn with_sides(
        conn: &mut SqliteConnection,
        row: OpportunityRow,
    ) -> Result<ArbitrageOpportunity> {
        let id = row
            .arb_id
            .ok_or_else(|| Error::Database("opportunity row without arb_id".into()))?;
        let sides = Self::load_sides(conn, id)?
            .ok_or_else(|| Error::Database(format!("opportunity {id} has no sides row")))?;
        row.into_domain(sides)
    }

    fn insert_in_transaction(
        conn: &mut SqliteConnection,
        opportunity: &NewOpportunity,
    ) -> std::result::Result<InsertOutcome, DieselError> {
        let pair = opportunity.pair();
        let existing: Option<Option<i32>> = arbitrage_opportunities::table
            .filter(Self::pair_filter(&pair))
            .select(arbitrage_opportunities::arb_id)
            .first(conn)
            .optional()?;
        if existing.is_some() {
            return Ok(InsertOutcome::Duplicate);
        }

        diesel::insert_into(arbitrage_opportunities::table)
            .values(&NewOpportunityRow::from_domain(opportunity))
            .execute(conn)?;

        let id: i32 = diesel::sql_query("SELECT last_insert_rowid() AS id")
            .get_result::<LastInsertRowId>(conn)
            .map(|row| row.id)?;

        diesel::insert_into(arbitrage_bet_sides::table)
            .values(&BetSidesRow::new(id, opportunity.side_1, opportunity.side_2))
            .execute(conn)?;

        diesel::update(
            markets::table.filter(markets::market_id.eq_any([
                opportunity.contract_1.to_string(),
                opportunity.contract_2.to_string(),
            ])),
        )
        .set(markets::is_arbitrage.eq(ArbitrageFlag::Yes.as_str()))
        .execute(conn)?;

        Ok(InsertOutcome::Inserted(ArbitrageId::new(id)))
    }
}

impl PriceSource for SqliteStore {
    async fn latest_quote(&self, option: &OptionId) -> Result<Option<OptionQuote>> {
        let mut conn = self.conn()?;

        let platform: Option<String> = options::table
            .inner_join(markets::table)
            .filter(options::option_id.eq(option.as_str()))
            .select(markets::platform)
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        let Some(platform) = platform else {
            return Ok(None);
        };

        let row: Option<SnapshotRow> = price_snapshots::table
            .filter(price_snapshots::option_id.eq(option.as_str()))
            .order(price_snapshots::timestamp.desc())
            .select(SnapshotRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(OptionQuote {
            platform: Platform::from(platform),
            snapshot: row.into_domain()?,
        }))
    }
}

impl CatalogStore for SqliteStore {
    async fn market(&self, id: &MarketId) -> Result<Option<Market>> {
        let mut conn = self.conn()?;
        let row: Option<MarketRow> = markets::table
            .find(id.as_str())
            .select(MarketRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(MarketRow::into_domain).transpose()
    }

    async fn options_for_market(&self, id: &MarketId) -> Result<Vec<MarketOption>> {
        let mut conn = self.conn()?;
        let rows: Vec<OptionRow> = options::table
            .filter(options::market_id.eq(id.as_str()))
            .order(options::option_id.asc())
            .select(OptionRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(OptionRow::into_domain).collect()
    }

    async fn option_market(&self, option: &OptionId) -> Result<Option<Market>> {
        let mut conn = self.conn()?;
        let row: Option<MarketRow> = options::table
            .inner_join(markets::table)
            .filter(options::option_id.eq(option.as_str()))
            .select(MarketRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(MarketRow::into_domain).transpose()
    }

    async fn market_matches(&self) -> Result<Vec<MarketMatch>> {
        let mut conn = self.conn()?;
        let rows: Vec<MarketMatchRow> = market_matches::table
            .order(market_matches::event_id.asc())
            .select(MarketMatchRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.into_iter().map(MarketMatchRow::into_domain).collect())
    }

    async fn option_matches(&self) -> Result<Vec<OptionMatch>> {
        let mut conn = self.conn()?;
        let rows: Vec<OptionMatchRow> = option_matches::table
            .order((option_matches::event_id.asc(), option_matches::id.asc()))
            .select(OptionMatchRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.into_iter().map(OptionMatchRow::into_domain).collect())
    }

    async fn save_option_matches(&self, matches: &[OptionMatch]) -> Result<usize> {
        if matches.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;
        let inserted = conn.immediate_transaction(|conn| {
            let mut inserted = 0;
            for m in matches {
                inserted += diesel::insert_or_ignore_into(option_matches::table)
                    .values(&NewOptionMatchRow::from_domain(m))
                    .execute(conn)?;
            }
            Ok::<_, DieselError>(inserted)
        })?;
        Ok(inserted)
    }
}

impl OpportunityStore for SqliteStore {
    async fn resolve_contract(&self, option: &OptionId) -> Result<Option<MarketId>> {
        let mut conn = self.conn()?;
        let market: Option<String> = options::table
            .find(option.as_str())
            .select(options::market_id)
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(market.map(MarketId::from))
    }

    async fn market_exists(&self, id: &MarketId) -> Result<bool> {
        let mut conn = self.conn()?;
        let count: i64 = markets::table
            .filter(markets::market_id.eq(id.as_str()))
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count > 0)
    }

    async fn insert_opportunity(&self, opportunity: &NewOpportunity) -> Result<InsertOutcome> {
        let mut conn = self.conn()?;
        match conn.immediate_transaction(|conn| Self::insert_in_transaction(conn, opportunity)) {
            Ok(outcome) => Ok(outcome),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                debug!(pair = %opportunity.pair(), "Unique index rejected duplicate pair");
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(Error::Database(e.to_string())),
        }
    }

    async fn find_by_pair(&self, pair: &ContractPair) -> Result<Option<ArbitrageOpportunity>> {
        let mut conn = self.conn()?;
        let row: Option<OpportunityRow> = arbitrage_opportunities::table
            .filter(Self::pair_filter(pair))
            .select(OpportunityRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(|row| Self::with_sides(&mut conn, row)).transpose()
    }

    async fn sides(&self, id: ArbitrageId) -> Result<Option<RecordedSides>> {
        let mut conn = self.conn()?;
        Self::load_sides(&mut conn, id.value())
    }

    async fn list_opportunities(&self) -> Result<Vec<ArbitrageOpportunity>> {
        let mut conn = self.conn()?;
        let rows: Vec<OpportunityRow> = arbitrage_opportunities::table
            .order((
                arbitrage_opportunities::timestamp.desc(),
                arbitrage_opportunities::arb_id.desc(),
            ))
            .select(OpportunityRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut sides: HashMap<i32, BetSidesRow> = arbitrage_bet_sides::table
            .select(BetSidesRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?
            .into_iter()
            .map(|row| (row.arb_id, row))
            .collect();

        rows.into_iter()
            .map(|row| {
                let id = row
                    .arb_id
                    .ok_or_else(|| Error::Database("opportunity row without arb_id".into()))?;
                let recorded = sides
                    .remove(&id)
                    .ok_or_else(|| Error::Database(format!("opportunity {id} has no sides row")))?
                    .into_domain()?;
                row.into_domain(recorded)
            })
            .collect()
    }
}

impl MaintenanceStore for SqliteStore {
    async fn upsert_market(&self, market: &Market) -> Result<()> {
        let row = MarketRow::from_domain(market);
        let mut conn = self.conn()?;

        // the arbitrage flag is owned by the ledger and survives re-ingest
        diesel::insert_into(markets::table)
            .values(&row)
            .on_conflict(markets::market_id)
            .do_update()
            .set((
                markets::title.eq(&row.title),
                markets::expiration_date.eq(&row.expiration_date),
                markets::platform.eq(&row.platform),
                markets::status.eq(&row.status),
            ))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_option(&self, option: &MarketOption) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::replace_into(options::table)
            .values(&OptionRow::from_domain(option))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn append_snapshot(&self, snapshot: &PriceSnapshot) -> Result<bool> {
        let mut conn = self.conn()?;
        let inserted = diesel::insert_or_ignore_into(price_snapshots::table)
            .values(&SnapshotRow::from_domain(snapshot))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    async fn upsert_market_match(&self, m: &MarketMatch) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::replace_into(market_matches::table)
            .values(&MarketMatchRow::from_domain(m))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn open_markets(&self) -> Result<Vec<Market>> {
        let mut conn = self.conn()?;
        let rows: Vec<MarketRow> = markets::table
            .filter(markets::status.eq(MarketStatus::Open.as_str()))
            .order(markets::market_id.asc())
            .select(MarketRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(MarketRow::into_domain).collect()
    }

    async fn close_markets(&self, ids: &[MarketId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<&str> = ids.iter().map(MarketId::as_str).collect();
        let mut conn = self.conn()?;
        let closed = diesel::update(
            markets::table
                .filter(markets::market_id.eq_any(ids))
                .filter(markets::status.eq(MarketStatus::Open.as_str())),
        )
        .set(markets::status.eq(MarketStatus::Closed.as_str()))
        .execute(&mut conn)
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(closed)
    }
}
