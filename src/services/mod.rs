//! Business logic services

pub mod catalog;
pub mod loans;
pub mod redis;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    pub redis: redis::RedisService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, redis: redis::RedisService) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), redis.clone()),
            loans: loans::LoansService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            redis,
            repository,
        }
    }
}
