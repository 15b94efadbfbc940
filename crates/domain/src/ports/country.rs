use crate::country::Country;
use crate::ports::BoxFuture;
use crate::DomainResult;

pub trait CountryRepository: Send + Sync {
    fn get(&self, id: i64) -> BoxFuture<'_, DomainResult<Option<Country>>>;

    fn list_active(&self) -> BoxFuture<'_, DomainResult<Vec<Country>>>;
}
