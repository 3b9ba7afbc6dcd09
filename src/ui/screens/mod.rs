pub(crate) mod export;
pub(crate) mod goals;
pub(crate) mod overview;
pub(crate) mod transactions;
