pub(crate) mod crawler;
pub(crate) mod farm;
pub(crate) mod statistics;
