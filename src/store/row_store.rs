use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::error::AppError;
use crate::store::schema::TableDef;
use crate::store::table::Table;
use crate::store::transport::{SheetsTransport, a1};

/// Injected time source so cache expiry and pacing are testable with a fake
/// clock instead of real sleeps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

const READ_CACHE_TTL: Duration = Duration::from_secs(30);

// The remote API rejects more than ~60 requests/minute; spacing calls out at
// 150ms keeps a single process comfortably under that.
const MIN_CALL_INTERVAL: Duration = Duration::from_millis(150);

struct CacheEntry {
    table: Table,
    read_at: Instant,
}

/// Named-table view over a remote workbook.
///
/// All state here is best-effort optimization, not correctness-bearing: the
/// read cache trims repeat reads within a request burst, the existence set
/// makes `ensure_tables` free after the first request, and the pacing gate
/// serializes remote calls to stay under the API rate limit.
pub struct RowStore {
    transport: Arc<dyn SheetsTransport>,
    clock: Box<dyn Clock>,
    cache_ttl: Duration,
    min_call_interval: Duration,
    read_cache: Mutex<HashMap<String, CacheEntry>>,
    known_sheets: Mutex<HashSet<String>>,
    last_call: Mutex<Option<Instant>>,
}

impl RowStore {
    pub fn new(transport: Arc<dyn SheetsTransport>) -> Self {
        Self::with_clock(transport, Box::new(SystemClock))
    }

    pub fn with_clock(transport: Arc<dyn SheetsTransport>, clock: Box<dyn Clock>) -> Self {
        Self {
            transport,
            clock,
            cache_ttl: READ_CACHE_TTL,
            min_call_interval: MIN_CALL_INTERVAL,
            read_cache: Mutex::new(HashMap::new()),
            known_sheets: Mutex::new(HashSet::new()),
            last_call: Mutex::new(None),
        }
    }

    /// Pacing off, for tests that drive many calls through the in-memory
    /// transport.
    #[cfg(test)]
    pub(crate) fn unthrottled(transport: Arc<dyn SheetsTransport>) -> Self {
        let mut store = Self::new(transport);
        store.min_call_interval = Duration::ZERO;
        store
    }

    /// Wait out the remainder of the minimum inter-call spacing. Coarse
    /// global throttle, not a scheduler; load is human-paced.
    async fn pace(&self) {
        let wait = {
            let mut last = self.last_call.lock().expect("pacing gate poisoned");
            let now = self.clock.now();
            let wait = match *last {
                Some(prev) => self
                    .min_call_interval
                    .checked_sub(now.duration_since(prev))
                    .unwrap_or(Duration::ZERO),
                None => Duration::ZERO,
            };
            *last = Some(now + wait);
            wait
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    fn invalidate(&self, name: &str) {
        self.read_cache
            .lock()
            .expect("read cache poisoned")
            .remove(name);
    }

    /// Full table snapshot, served from the TTL cache when fresh.
    #[instrument(skip(self, def), fields(table = def.name))]
    pub async fn read_table(&self, def: &TableDef) -> Result<Table, AppError> {
        {
            let cache = self.read_cache.lock().expect("read cache poisoned");
            if let Some(entry) = cache.get(def.name) {
                if self.clock.now().duration_since(entry.read_at) < self.cache_ttl {
                    debug!("Serving table from cache");
                    return Ok(entry.table.clone());
                }
            }
        }

        self.pace().await;
        let grid = self.transport.get_values(def.name).await?;
        let table = Table::from_grid(def.name, grid);

        let mut cache = self.read_cache.lock().expect("read cache poisoned");
        cache.insert(
            def.name.to_string(),
            CacheEntry {
                table: table.clone(),
                read_at: self.clock.now(),
            },
        );
        Ok(table)
    }

    /// Append one row; the caller builds `values` in the table's current
    /// header order.
    #[instrument(skip(self, def, values), fields(table = def.name))]
    pub async fn append_row(&self, def: &TableDef, values: Vec<String>) -> Result<(), AppError> {
        self.invalidate(def.name);
        self.pace().await;
        self.transport.append(def.name, values).await?;
        Ok(())
    }

    /// Overwrite one cell. `row` is 0-based over the full grid including the
    /// header, matching `Table` row indices.
    #[instrument(skip(self, def, value), fields(table = def.name))]
    pub async fn update_cell(
        &self,
        def: &TableDef,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), AppError> {
        self.invalidate(def.name);
        self.pace().await;
        self.transport
            .update_range(def.name, &a1(row, col), vec![vec![value.to_string()]])
            .await?;
        Ok(())
    }

    #[instrument(skip(self, def, values), fields(table = def.name))]
    pub async fn update_range(
        &self,
        def: &TableDef,
        start_cell: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), AppError> {
        self.invalidate(def.name);
        self.pace().await;
        self.transport
            .update_range(def.name, start_cell, values)
            .await?;
        Ok(())
    }

    /// Remove one row by 0-based index. Later indices shift down; any index
    /// computed before this call must be recomputed after it.
    #[instrument(skip(self, def), fields(table = def.name))]
    pub async fn delete_row(&self, def: &TableDef, row: usize) -> Result<(), AppError> {
        self.invalidate(def.name);
        self.pace().await;
        self.transport.delete_row(def.name, row).await?;
        Ok(())
    }

    /// Idempotent creation for a batch of tables: list sheet titles once,
    /// create whatever is missing, and write the default header row into any
    /// sheet that has no rows at all. Cached per process, so calling this on
    /// every request costs nothing after the first.
    #[instrument(skip_all)]
    pub async fn ensure_tables(&self, defs: &[&TableDef]) -> Result<(), AppError> {
        let pending: Vec<&TableDef> = {
            let known = self.known_sheets.lock().expect("existence cache poisoned");
            defs.iter()
                .filter(|d| !known.contains(d.name))
                .copied()
                .collect()
        };
        if pending.is_empty() {
            return Ok(());
        }

        self.pace().await;
        let titles: HashSet<String> = self.transport.sheet_titles().await?.into_iter().collect();

        for def in pending {
            let header: Vec<String> = def.headers.iter().map(|h| h.to_string()).collect();
            if !titles.contains(def.name) {
                info!(table = def.name, "Creating missing sheet");
                self.pace().await;
                self.transport.add_sheet(def.name).await?;
                self.pace().await;
                self.transport
                    .update_range(def.name, "A1", vec![header])
                    .await?;
            } else {
                self.pace().await;
                let grid = self.transport.get_values(def.name).await?;
                if grid.is_empty() {
                    info!(table = def.name, "Writing header row into empty sheet");
                    self.pace().await;
                    self.transport
                        .update_range(def.name, "A1", vec![header])
                        .await?;
                }
            }
            self.known_sheets
                .lock()
                .expect("existence cache poisoned")
                .insert(def.name.to_string());
        }
        Ok(())
    }

    pub async fn ensure_table(&self, def: &TableDef) -> Result<(), AppError> {
        self.ensure_tables(&[def]).await
    }
}
