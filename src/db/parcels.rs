// src/db/parcels.rs
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use tracing::debug;

use crate::db::connection::Database;
use crate::db::port::{
    Agg, AggRow, Assignment, Field, OrderBy, ParcelStore, Predicate, StarredParcel,
};
use crate::domain::geometry::Point;
use crate::domain::normalize::normalize;
use crate::domain::parcel::ParcelRow;
use crate::errors::StoreError;

const SALE_DATE_COLUMNS: [&str; 4] = ["sale_date1", "sale_date2", "sale_date3", "sale_date4"];

const PARCEL_COLUMNS: &str = "object_id, pin, prop_address, prop_str_num, prop_dir, \
     prop_str_name, prop_str_type, prop_suffix, prop_city, prop_zip5, owner1, owner2, owner3, \
     mail_str_num, mail_dir, mail_str_name, mail_str_type, mail_suffix, mail_city, mail_state, \
     mail_zip5, mail_zip4, value_current, x_coord, y_coord, ownership_code, neighborhood";

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Field::ObjectId => "object_id",
            Field::Pin => "pin",
            Field::RecordCode => "record_code",
            Field::PropAddress => "prop_address",
            Field::PropStreetName => "prop_str_name",
            Field::PropStreetType => "prop_str_type",
            Field::City => "prop_city",
            Field::Zip => "prop_zip5",
            Field::Owner1 => "owner1",
            Field::Owner2 => "owner2",
            Field::Owner3 => "owner3",
            Field::MailStreetNumber => "mail_str_num",
            Field::MailDirection => "mail_dir",
            Field::MailStreetName => "mail_str_name",
            Field::MailStreetType => "mail_str_type",
            Field::MailSuffix => "mail_suffix",
            Field::MailCity => "mail_city",
            Field::MailState => "mail_state",
            Field::MailZip5 => "mail_zip5",
            Field::MailZip4 => "mail_zip4",
            Field::ValueCurrent => "value_current",
            Field::ValuePrior => "value_prior",
            Field::X => "x_coord",
            Field::Y => "y_coord",
            Field::PropertyType => "property_type",
            Field::Neighborhood => "neighborhood",
            Field::Subdivision => "subdivision",
            Field::TaxClass => "tax_class",
        }
    }
}

/// True for plain SQL identifiers; the only text ever spliced into queries.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Accumulates SQL text and its positional parameters in lockstep.
#[derive(Debug, Default)]
struct SqlBuilder {
    sql: String,
    params: Vec<Value>,
}

impl SqlBuilder {
    fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn bind(&mut self, value: Value) {
        self.sql.push('?');
        self.params.push(value);
    }

    fn squared_distance(&mut self, origin: &Point) {
        self.push("((x_coord - ");
        self.bind(Value::Real(origin.x));
        self.push(") * (x_coord - ");
        self.bind(Value::Real(origin.x));
        self.push(") + (y_coord - ");
        self.bind(Value::Real(origin.y));
        self.push(") * (y_coord - ");
        self.bind(Value::Real(origin.y));
        self.push("))");
    }

    fn predicate(&mut self, p: &Predicate) {
        match p {
            Predicate::All => self.push("1 = 1"),
            Predicate::Matches(field, value) => {
                self.push(&format!("norm({}) = ", field.column()));
                self.bind(Value::Text(normalize(value)));
            }
            Predicate::Contains(field, needle) => {
                self.push(&format!("instr(norm({}), ", field.column()));
                self.bind(Value::Text(normalize(needle)));
                self.push(") > 0");
            }
            Predicate::StartsWith(field, prefix) => {
                let prefix = normalize(prefix);
                self.push(&format!("substr(norm({}), 1, ", field.column()));
                self.bind(Value::Integer(prefix.chars().count() as i64));
                self.push(") = ");
                self.bind(Value::Text(prefix));
            }
            Predicate::NotNull(field) => self.push(&format!("{} IS NOT NULL", field.column())),
            Predicate::Within {
                origin,
                radius_feet,
            } => {
                self.squared_distance(origin);
                self.push(" <= ");
                self.bind(Value::Real(radius_feet * radius_feet));
            }
            Predicate::SoldBetween { from, to } => {
                // Dates may carry a time part, so the upper bound is the next day, exclusive.
                let upper = to.succ_opt().unwrap_or(*to);
                self.push("(");
                for (i, col) in SALE_DATE_COLUMNS.iter().enumerate() {
                    if i > 0 {
                        self.push(" OR ");
                    }
                    self.push(&format!("({col} >= "));
                    self.bind(Value::Text(from.format("%Y-%m-%d").to_string()));
                    self.push(&format!(" AND {col} < "));
                    self.bind(Value::Text(upper.format("%Y-%m-%d").to_string()));
                    self.push(")");
                }
                self.push(")");
            }
            Predicate::And(parts) => self.join(parts, " AND ", "1 = 1"),
            Predicate::Or(parts) => self.join(parts, " OR ", "1 = 0"),
            Predicate::Not(inner) => {
                self.push("NOT (");
                self.predicate(inner);
                self.push(")");
            }
        }
    }

    fn join(&mut self, parts: &[Predicate], sep: &str, empty: &str) {
        if parts.is_empty() {
            self.push(empty);
            return;
        }
        self.push("(");
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            self.predicate(part);
        }
        self.push(")");
    }

    fn aggregate(&mut self, agg: &Agg) {
        match agg {
            Agg::CountAll => self.push("COUNT(*)"),
            Agg::Count(f) => self.push(&format!("COUNT({})", f.column())),
            Agg::Min(f) => self.push(&format!("MIN({})", f.column())),
            Agg::Max(f) => self.push(&format!("MAX({})", f.column())),
            Agg::Avg(f) => self.push(&format!("AVG({})", f.column())),
            Agg::Sum(f) => self.push(&format!("SUM({})", f.column())),
            Agg::CountDistinct(f) => self.push(&format!("COUNT(DISTINCT {})", f.column())),
            Agg::CountDistinctWhere(f, p) => {
                self.push("COUNT(DISTINCT CASE WHEN ");
                self.predicate(p);
                self.push(&format!(" THEN {} END)", f.column()));
            }
        }
    }

    fn order(&mut self, order: &OrderBy) {
        match order {
            OrderBy::Natural => self.push(" ORDER BY object_id"),
            OrderBy::Asc(f) => self.push(&format!(" ORDER BY {} ASC, object_id", f.column())),
            OrderBy::DistanceFrom(origin) => {
                self.push(" ORDER BY ");
                self.squared_distance(origin);
                self.push(" ASC, object_id");
            }
        }
    }
}

fn parcel_from_row(row: &Row<'_>) -> rusqlite::Result<ParcelRow> {
    Ok(ParcelRow {
        object_id: row.get("object_id")?,
        pin: row.get("pin")?,
        prop_address: row.get("prop_address")?,
        prop_street_number: row.get("prop_str_num")?,
        prop_direction: row.get("prop_dir")?,
        prop_street_name: row.get("prop_str_name")?,
        prop_street_type: row.get("prop_str_type")?,
        prop_suffix: row.get("prop_suffix")?,
        city: row.get("prop_city")?,
        zip: row.get("prop_zip5")?,
        owners: [row.get("owner1")?, row.get("owner2")?, row.get("owner3")?],
        mail_street_number: row.get("mail_str_num")?,
        mail_direction: row.get("mail_dir")?,
        mail_street_name: row.get("mail_str_name")?,
        mail_street_type: row.get("mail_str_type")?,
        mail_suffix: row.get("mail_suffix")?,
        mail_city: row.get("mail_city")?,
        mail_state: row.get("mail_state")?,
        mail_zip5: row.get("mail_zip5")?,
        mail_zip4: row.get("mail_zip4")?,
        value_current: row.get("value_current")?,
        x: row.get("x_coord")?,
        y: row.get("y_coord")?,
        ownership_code: row.get("ownership_code")?,
        neighborhood: row.get("neighborhood")?,
    })
}

/// SQLite implementation of the parcel store.
#[derive(Clone, Debug)]
pub struct SqliteParcelStore {
    db: Database,
    table: String,
}

impl SqliteParcelStore {
    pub fn new(db: Database, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        if !is_sql_identifier(&table) {
            return Err(StoreError::Schema(format!("invalid table name {table:?}")));
        }
        Ok(Self { db, table })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn select(&self, filter: &Predicate, order: &OrderBy, limit: Option<usize>) -> SqlBuilder {
        let mut q = SqlBuilder::default();
        q.push(&format!("SELECT {PARCEL_COLUMNS} FROM {} WHERE ", self.table));
        q.predicate(filter);
        q.order(order);
        if let Some(limit) = limit {
            q.push(" LIMIT ");
            q.bind(Value::Integer(limit as i64));
        }
        q
    }

    fn query_parcels(&self, q: SqlBuilder) -> Result<Vec<ParcelRow>, StoreError> {
        debug!(sql = %q.sql, params = q.params.len(), "parcel query");
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&q.sql)?;
            let rows = stmt.query_map(params_from_iter(q.params.iter()), parcel_from_row)?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }
}

impl ParcelStore for SqliteParcelStore {
    fn find_one(&self, filter: &Predicate) -> Result<Option<ParcelRow>, StoreError> {
        let q = self.select(filter, &OrderBy::Natural, Some(1));
        Ok(self.query_parcels(q)?.into_iter().next())
    }

    fn aggregate(
        &self,
        group_by: &[Field],
        filter: &Predicate,
        aggs: &[Agg],
    ) -> Result<Vec<AggRow>, StoreError> {
        let mut q = SqlBuilder::default();
        q.push("SELECT ");
        let mut first = true;
        for field in group_by {
            if !first {
                q.push(", ");
            }
            first = false;
            q.push(&format!("NULLIF(norm({}), '')", field.column()));
        }
        for agg in aggs {
            if !first {
                q.push(", ");
            }
            first = false;
            q.aggregate(agg);
        }
        q.push(&format!(" FROM {} WHERE ", self.table));
        q.predicate(filter);
        if !group_by.is_empty() {
            let positions: Vec<String> = (1..=group_by.len()).map(|i| i.to_string()).collect();
            q.push(&format!(" GROUP BY {}", positions.join(", ")));
        }

        debug!(sql = %q.sql, params = q.params.len(), "parcel aggregate");
        let n_keys = group_by.len();
        let n_values = aggs.len();
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&q.sql)?;
            let rows = stmt.query_map(params_from_iter(q.params.iter()), |row| {
                let mut keys = Vec::with_capacity(n_keys);
                for i in 0..n_keys {
                    keys.push(row.get::<_, Option<String>>(i)?);
                }
                let mut values = Vec::with_capacity(n_values);
                for i in 0..n_values {
                    values.push(row.get::<_, Option<f64>>(n_keys + i)?);
                }
                Ok(AggRow { keys, values })
            })?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }

    fn range_query(
        &self,
        filter: &Predicate,
        order: &OrderBy,
        limit: Option<usize>,
    ) -> Result<Vec<ParcelRow>, StoreError> {
        let q = self.select(filter, order, limit);
        self.query_parcels(q)
    }

    fn count(&self, filter: &Predicate) -> Result<i64, StoreError> {
        let mut q = SqlBuilder::default();
        q.push(&format!("SELECT COUNT(*) FROM {} WHERE ", self.table));
        q.predicate(filter);
        self.db.with_conn(|conn| {
            Ok(conn.query_row(&q.sql, params_from_iter(q.params.iter()), |r| r.get(0))?)
        })
    }

    fn update(&self, filter: &Predicate, fields: &[Assignment]) -> Result<usize, StoreError> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut q = SqlBuilder::default();
        q.push(&format!("UPDATE {} SET ", self.table));
        for (i, assignment) in fields.iter().enumerate() {
            if i > 0 {
                q.push(", ");
            }
            q.push(&format!("{} = ", assignment.field.column()));
            q.bind(match &assignment.value {
                Some(v) => Value::Text(v.clone()),
                None => Value::Null,
            });
        }
        q.push(" WHERE ");
        q.predicate(filter);

        debug!(sql = %q.sql, "parcel update");
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let affected = tx.execute(&q.sql, params_from_iter(q.params.iter()))?;
            tx.commit()?;
            Ok(affected)
        })
    }

    fn append_star(&self, star: &StarredParcel) -> Result<usize, StoreError> {
        self.db.with_conn(|conn| {
            Ok(conn.execute(
                "insert or ignore into starred_parcels (username, object_id, created_at)
                 values (?, ?, ?)",
                params![star.username, star.object_id, star.created_at],
            )?)
        })
    }

    fn remove_star(&self, username: &str, object_id: i64) -> Result<usize, StoreError> {
        self.db.with_conn(|conn| {
            Ok(conn.execute(
                "delete from starred_parcels where username = ? and object_id = ?",
                params![username, object_id],
            )?)
        })
    }

    fn stars_for(&self, username: &str) -> Result<Vec<StarredParcel>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "select username, object_id, created_at from starred_parcels
                 where username = ?
                 order by created_at desc, id desc",
            )?;
            let rows = stmt.query_map(params![username], |r| {
                Ok(StarredParcel {
                    username: r.get(0)?,
                    object_id: r.get(1)?,
                    created_at: r.get(2)?,
                })
            })?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }
}
