//! [`Rental`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        rental::{self, Period},
        Rental,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Builds a [`Rental`] out of the `rentals` table [`Row`].
fn from_row(row: &Row) -> Rental {
    #[expect(unsafe_code, reason = "ensured by the table `CHECK` constraint")]
    let period = unsafe {
        Period::new_unchecked(row.get("start_date"), row.get("end_date"))
    };
    Rental {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        vehicle_id: row.get("vehicle_id"),
        period,
        total_price: row.get("total_price"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Rental>, rental::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rental>, rental::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: rental::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, customer_id, vehicle_id, \
                   start_date, end_date, \
                   total_price, status, created_at \
            FROM rentals \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Rental>, read::rental::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rental>, read::rental::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental::list::Filter {
            customer_id,
            vehicle_id,
            status,
            ends_before,
        } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];
        if let Some(id) = &customer_id {
            ps.push(id);
            conditions.push(format!("customer_id = ${}::UUID", ps.len()));
        }
        if let Some(id) = &vehicle_id {
            ps.push(id);
            conditions.push(format!("vehicle_id = ${}::UUID", ps.len()));
        }
        if let Some(status) = &status {
            ps.push(status);
            conditions.push(format!("status = ${}::INT2", ps.len()));
        }
        if let Some(dt) = &ends_before {
            ps.push(dt);
            conditions.push(format!("end_date < ${}::TIMESTAMPTZ", ps.len()));
        }

        let sql = format!(
            "SELECT id, customer_id, vehicle_id, \
                    start_date, end_date, \
                    total_price, status, created_at \
             FROM rentals \
             WHERE TRUE {filtering} \
             ORDER BY created_at ASC, id ASC",
            filtering = conditions
                .iter()
                .format_with("", |cond, f| f(&format_args!("AND {cond} "))),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Rental>, read::rental::Overlapping>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rental>, read::rental::Overlapping>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental::Overlapping { vehicle_id, period } = by.into_inner();
        let (start, end) = (period.start(), period.end());

        const SQL: &str = "\
            SELECT id, customer_id, vehicle_id, \
                   start_date, end_date, \
                   total_price, status, created_at \
            FROM rentals \
            WHERE vehicle_id = $1::UUID \
              AND status = $2::INT2 \
              AND (start_date BETWEEN $3::TIMESTAMPTZ AND $4::TIMESTAMPTZ \
                   OR end_date BETWEEN $3::TIMESTAMPTZ AND $4::TIMESTAMPTZ) \
            ORDER BY created_at ASC, id ASC";
        Ok(self
            .query(SQL, &[&vehicle_id, &rental::Status::Active, &start, &end])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Rental>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Rental>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(rental): Insert<Rental>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(rental)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Rental>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(rental): Update<Rental>,
    ) -> Result<Self::Ok, Self::Err> {
        let Rental {
            id,
            customer_id,
            vehicle_id,
            period,
            total_price,
            status,
            created_at,
        } = rental;
        let (start, end) = (period.start(), period.end());

        const SQL: &str = "\
            INSERT INTO rentals (\
                id, customer_id, vehicle_id, \
                start_date, end_date, \
                total_price, status, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::TIMESTAMPTZ, $5::TIMESTAMPTZ, \
                $6::NUMERIC, $7::INT2, $8::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status";
        self.exec(
            SQL,
            &[
                &id,
                &customer_id,
                &vehicle_id,
                &start,
                &end,
                &total_price,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Rental, rental::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Rental, rental::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: rental::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM rentals \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
