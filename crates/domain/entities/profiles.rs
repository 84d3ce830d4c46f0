use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::profiles;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(primary_key(user_id))]
#[diesel(table_name = profiles)]
pub struct ProfileEntity {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birthday_discount_year: Option<i32>,
}
