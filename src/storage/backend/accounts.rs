use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::converters::{account_to_active_model, model_to_account};
use super::{SeaOrmStorage, is_unique_violation, retry};
use crate::errors::{Result, ShepherdError};
use crate::storage::models::Account;

use migration::entities::account;

impl SeaOrmStorage {
    /// 插入账户，邮箱已注册时返回 Conflict
    pub async fn insert_account(&self, acct: &Account) -> Result<()> {
        let db = &self.db;

        retry::with_retry("insert_account", self.retry_config, || async {
            account::Entity::insert(account_to_active_model(acct))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ShepherdError::conflict(format!("Email '{}' is already registered", acct.email))
            } else {
                ShepherdError::database_operation(format!("创建账户失败: {}", e))
            }
        })?;

        info!("Account created: {}", acct.id);
        Ok(())
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let db = &self.db;

        let model = retry::with_retry("find_account_by_email", self.retry_config, || async {
            account::Entity::find()
                .filter(account::Column::Email.eq(email))
                .one(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询账户失败: {}", e)))?;

        Ok(model.map(model_to_account))
    }

    pub async fn find_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        let db = &self.db;

        let model = retry::with_retry("find_account_by_id", self.retry_config, || async {
            account::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询账户失败: {}", e)))?;

        Ok(model.map(model_to_account))
    }

    pub async fn find_account_by_google_id(&self, google_id: &str) -> Result<Option<Account>> {
        let db = &self.db;

        let model = retry::with_retry("find_account_by_google_id", self.retry_config, || async {
            account::Entity::find()
                .filter(account::Column::GoogleId.eq(google_id))
                .one(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询账户失败: {}", e)))?;

        Ok(model.map(model_to_account))
    }

    /// 整行更新（id 不变）
    pub async fn update_account(&self, acct: &Account) -> Result<()> {
        let db = &self.db;

        retry::with_retry("update_account", self.retry_config, || async {
            account::Entity::update(account_to_active_model(acct))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                ShepherdError::not_found(format!("Account '{}' not found", acct.id))
            }
            e if is_unique_violation(&e) => {
                ShepherdError::conflict(format!("Email '{}' is already registered", acct.email))
            }
            e => ShepherdError::database_operation(format!("更新账户失败: {}", e)),
        })
    }

    /// 全部账户，新注册在前
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let db = &self.db;

        let models = retry::with_retry("list_accounts", self.retry_config, || async {
            account::Entity::find()
                .order_by_desc(account::Column::CreatedAt)
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("查询账户列表失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_account).collect())
    }

    /// 批量查询账户，返回 id -> Account
    pub async fn find_accounts_by_ids(&self, ids: &[String]) -> Result<HashMap<String, Account>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let db = &self.db;

        let models = retry::with_retry("find_accounts_by_ids", self.retry_config, || async {
            account::Entity::find()
                .filter(account::Column::Id.is_in(ids.iter().cloned()))
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShepherdError::database_operation(format!("批量查询账户失败: {}", e)))?;

        Ok(models
            .into_iter()
            .map(|m| {
                let acct = model_to_account(m);
                (acct.id.clone(), acct)
            })
            .collect())
    }
}
