pub mod config;
pub mod decoder;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod geojson;
pub mod server;
pub mod snapshot;
pub mod transform;

#[cfg(test)]
mod test_support;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
