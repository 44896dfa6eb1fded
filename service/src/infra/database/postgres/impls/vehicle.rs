//! [`Vehicle`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        vehicle::{self, Car, Details, Motorcycle, Truck},
        Vehicle,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// `SELECT` clause of a [`Vehicle`] row along with its [`Details`].
macro_rules! select_vehicles {
    () => {
        "SELECT v.id, v.kind, v.brand, v.model, v.year, \
                v.daily_rate, v.available, v.created_at, \
                c.doors, c.fuel_type, c.automatic, \
                m.engine_size, m.kind AS motorcycle_kind, \
                t.capacity, t.four_wheel_drive \
         FROM vehicles v \
         LEFT JOIN cars c ON c.id = v.id \
         LEFT JOIN motorcycles m ON m.id = v.id \
         LEFT JOIN trucks t ON t.id = v.id "
    };
}

/// Builds a [`Vehicle`] out of the [`select_vehicles!`] [`Row`].
fn from_row(row: &Row) -> Vehicle {
    let details = match row.get::<_, vehicle::Kind>("kind") {
        vehicle::Kind::Car => Car {
            doors: row.get("doors"),
            fuel_type: row.get("fuel_type"),
            automatic: row.get("automatic"),
        }
        .into(),
        vehicle::Kind::Motorcycle => Motorcycle {
            engine_size: row.get("engine_size"),
            kind: row.get("motorcycle_kind"),
        }
        .into(),
        vehicle::Kind::Truck => Truck {
            capacity: row.get("capacity"),
            four_wheel_drive: row.get("four_wheel_drive"),
        }
        .into(),
    };
    Vehicle {
        id: row.get("id"),
        brand: row.get("brand"),
        model: row.get("model"),
        year: row.get("year"),
        daily_rate: row.get("daily_rate"),
        available: row.get("available"),
        details,
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[vehicle::Id]>,
{
    type Ok = HashMap<vehicle::Id, Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[vehicle::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        const SQL: &str = concat!(
            select_vehicles!(),
            "WHERE v.id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .map(|v| (v.id, v))
            .collect())
    }
}

impl<C> Database<Select<By<Option<Vehicle>, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<vehicle::Id, Vehicle>, [vehicle::Id; 1]>>,
        Ok = HashMap<vehicle::Id, Vehicle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::vehicle::list::Filter {
            brand,
            model,
            min_year,
            max_year,
            min_daily_rate,
            max_daily_rate,
            available,
        } = by.into_inner();

        let brand = brand.as_deref().map(LikePattern::containing);
        let model = model.as_deref().map(LikePattern::containing);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];
        if let Some(brand) = &brand {
            ps.push(brand);
            conditions.push(format!("v.brand ILIKE ${}::VARCHAR", ps.len()));
        }
        if let Some(model) = &model {
            ps.push(model);
            conditions.push(format!("v.model ILIKE ${}::VARCHAR", ps.len()));
        }
        if let Some(year) = &min_year {
            ps.push(year);
            conditions.push(format!("v.year >= ${}::INT4", ps.len()));
        }
        if let Some(year) = &max_year {
            ps.push(year);
            conditions.push(format!("v.year <= ${}::INT4", ps.len()));
        }
        if let Some(rate) = &min_daily_rate {
            ps.push(rate);
            conditions.push(format!("v.daily_rate >= ${}::NUMERIC", ps.len()));
        }
        if let Some(rate) = &max_daily_rate {
            ps.push(rate);
            conditions.push(format!("v.daily_rate <= ${}::NUMERIC", ps.len()));
        }
        if let Some(available) = &available {
            ps.push(available);
            conditions.push(format!("v.available = ${}::BOOLEAN", ps.len()));
        }

        let sql = format!(
            "{select} \
             WHERE TRUE {filtering} \
             ORDER BY v.created_at ASC, v.id ASC",
            select = select_vehicles!(),
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

impl<C> Database<Select<By<read::vehicle::HasRentals, vehicle::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::vehicle::HasRentals;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::vehicle::HasRentals, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT EXISTS (\
                SELECT 1 FROM rentals WHERE vehicle_id = $1::UUID\
            )";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, bool>(0).into())
    }
}

impl<C> Database<Insert<Vehicle>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Vehicle>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(vehicle)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Vehicle>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        let kind = vehicle.kind();
        let Vehicle {
            id,
            brand,
            model,
            year,
            daily_rate,
            available,
            details,
            created_at,
        } = vehicle;

        const SQL: &str = "\
            INSERT INTO vehicles (\
                id, kind, \
                brand, model, year, \
                daily_rate, available, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::INT2, \
                $3::VARCHAR, $4::VARCHAR, $5::INT4, \
                $6::NUMERIC, $7::BOOLEAN, \
                $8::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET brand = EXCLUDED.brand, \
                model = EXCLUDED.model, \
                year = EXCLUDED.year, \
                daily_rate = EXCLUDED.daily_rate, \
                available = EXCLUDED.available";
        _ = self
            .exec(
                SQL,
                &[
                    &id,
                    &kind,
                    &brand,
                    &model,
                    &year,
                    &daily_rate,
                    &available,
                    &created_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        let details_res = match details {
            Details::Car(Car {
                doors,
                fuel_type,
                automatic,
            }) => {
                const SQL: &str = "\
                    INSERT INTO cars (id, doors, fuel_type, automatic) \
                    VALUES ($1::UUID, $2::INT4, $3::INT2, $4::BOOLEAN) \
                    ON CONFLICT (id) DO UPDATE \
                    SET doors = EXCLUDED.doors, \
                        fuel_type = EXCLUDED.fuel_type, \
                        automatic = EXCLUDED.automatic";
                self.exec(SQL, &[&id, &doors, &fuel_type, &automatic]).await
            }
            Details::Motorcycle(Motorcycle { engine_size, kind }) => {
                const SQL: &str = "\
                    INSERT INTO motorcycles (id, engine_size, kind) \
                    VALUES ($1::UUID, $2::INT4, $3::VARCHAR) \
                    ON CONFLICT (id) DO UPDATE \
                    SET engine_size = EXCLUDED.engine_size, \
                        kind = EXCLUDED.kind";
                self.exec(SQL, &[&id, &engine_size, &kind]).await
            }
            Details::Truck(Truck {
                capacity,
                four_wheel_drive,
            }) => {
                const SQL: &str = "\
                    INSERT INTO trucks (id, capacity, four_wheel_drive) \
                    VALUES ($1::UUID, $2::INT4, $3::BOOLEAN) \
                    ON CONFLICT (id) DO UPDATE \
                    SET capacity = EXCLUDED.capacity, \
                        four_wheel_drive = EXCLUDED.four_wheel_drive";
                self.exec(SQL, &[&id, &capacity, &four_wheel_drive]).await
            }
        };
        details_res.map_err(tracerr::wrap!()).map(drop)
    }
}

impl<C> Database<Delete<By<Vehicle, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: vehicle::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM vehicles \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Vehicle, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: vehicle::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM vehicles \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
