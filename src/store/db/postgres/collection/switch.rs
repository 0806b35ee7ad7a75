use sea_query::{
    Alias as SeaAlias, ColumnDef, Expr as SeaExpr, Func as SeaFunc, Iden, Index, Order as SeaOrder, PostgresQueryBuilder, Query as SeaQuery, Table,
};
use sea_query_binder::SqlxBinder;
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::{
    Result,
    store::{
        DbCollection, PageData, data,
        db::postgres::{DbInit, DbRow},
        query,
    },
};

use super::{DbConnection, into_query, map_db_err};

pub struct SwitchCollection {
    conn: DbConnection,
}

#[derive(Iden)]
#[iden = "switches"]
enum CollectionIden {
    Table,

    Id,
    State,
    Timestamp,
}

impl DbCollection for SwitchCollection {
    type Item = data::Switch;

    fn exists(
        &self,
        id: &str,
    ) -> Result<bool> {
        let (sql, values) = SeaQuery::select()
            .from(CollectionIden::Table)
            .expr(SeaFunc::count(SeaExpr::col(CollectionIden::Id)))
            .and_where(SeaExpr::col(CollectionIden::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let count = self.conn.query_one(sql.as_str(), values).map(|row| row.get::<i64, usize>(0)).map_err(map_db_err)?;

        Ok(count > 0)
    }

    fn find(
        &self,
        id: &str,
    ) -> Result<Self::Item> {
        let (sql, values) = SeaQuery::select()
            .from(CollectionIden::Table)
            .columns([CollectionIden::Id, CollectionIden::State, CollectionIden::Timestamp])
            .and_where(SeaExpr::col(CollectionIden::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let row = self.conn.query_one(&sql, values).map_err(map_db_err)?;
        Self::Item::from_row(&row).map_err(map_db_err)
    }

    fn query(
        &self,
        q: &query::Query,
    ) -> Result<PageData<Self::Item>> {
        let filter = into_query(q);

        let mut count_query = SeaQuery::select();
        count_query.from(CollectionIden::Table).expr(SeaFunc::count(SeaExpr::col(SeaAlias::new("id"))));

        let mut query = SeaQuery::select();
        query.columns([CollectionIden::Id, CollectionIden::State, CollectionIden::Timestamp]).from(CollectionIden::Table);

        if !filter.is_empty() {
            count_query.cond_where(filter.clone());
            query.cond_where(filter);
        }

        for (order, rev) in q.order_by().iter() {
            query.order_by(
                SeaAlias::new(order),
                if *rev {
                    SeaOrder::Desc
                } else {
                    SeaOrder::Asc
                },
            );
        }
        let (sql, values) = query.limit(q.limit() as u64).offset(q.offset() as u64).build_sqlx(PostgresQueryBuilder);

        let (count_sql, count_values) = count_query.build_sqlx(PostgresQueryBuilder);
        let count = self.conn.query_one(count_sql.as_str(), count_values).map_err(map_db_err)?.get::<i64, usize>(0) as usize;
        let rows = self
            .conn
            .query(&sql, values)
            .map_err(map_db_err)?
            .iter()
            .map(Self::Item::from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_db_err)?;

        Ok(PageData {
            count,
            page_size: q.limit(),
            page_num: q.offset() / q.limit() + 1,
            page_count: count.div_ceil(q.limit()),
            rows,
        })
    }

    fn create(
        &self,
        data: &Self::Item,
    ) -> Result<bool> {
        let data = data.clone();
        let (sql, sql_values) = SeaQuery::insert()
            .into_table(CollectionIden::Table)
            .columns([CollectionIden::Id, CollectionIden::State, CollectionIden::Timestamp])
            .values([data.id.into(), data.state.into(), data.timestamp.into()])
            .map_err(map_db_err)?
            .build_sqlx(PostgresQueryBuilder);

        let result = self.conn.execute(sql.as_str(), sql_values).map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    fn update(
        &self,
        data: &Self::Item,
    ) -> Result<bool> {
        let model = data.clone();
        let (sql, sql_values) = SeaQuery::update()
            .table(CollectionIden::Table)
            .values([(CollectionIden::State, model.state.into()), (CollectionIden::Timestamp, model.timestamp.into())])
            .and_where(SeaExpr::col(CollectionIden::Id).eq(data.id()))
            .build_sqlx(PostgresQueryBuilder);

        let result = self.conn.execute(sql.as_str(), sql_values).map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    fn delete(
        &self,
        id: &str,
    ) -> Result<bool> {
        let (sql, values) =
            SeaQuery::delete().from_table(CollectionIden::Table).and_where(SeaExpr::col(CollectionIden::Id).eq(id)).build_sqlx(PostgresQueryBuilder);

        let result = self.conn.execute(sql.as_str(), values).map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

impl DbRow for data::Switch {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &PgRow) -> std::result::Result<Self, DbError>
    where
        Self: Sized,
    {
        Ok(Self {
            id: row.try_get("id")?,
            state: row.try_get("state")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}

impl DbInit for SwitchCollection {
    fn init(&self) -> Result<()> {
        let sql = [
            Table::create()
                .table(CollectionIden::Table)
                .if_not_exists()
                .col(ColumnDef::new(CollectionIden::Id).string().not_null().primary_key())
                .col(ColumnDef::new(CollectionIden::State).string().not_null())
                .col(ColumnDef::new(CollectionIden::Timestamp).big_integer().default(0))
                .build(PostgresQueryBuilder),
            Index::create().name("idx_switches_state").if_not_exists().table(CollectionIden::Table).col(CollectionIden::State).build(PostgresQueryBuilder),
        ];

        self.conn.batch_execute(&sql).map_err(map_db_err)
    }
}

impl SwitchCollection {
    pub fn new(conn: &DbConnection) -> Self {
        Self {
            conn: conn.clone(),
        }
    }
}
