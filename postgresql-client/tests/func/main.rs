mod server;

mod database;
mod live;
mod transactions;
