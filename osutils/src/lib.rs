pub mod block_devices;
pub mod cow;
pub mod dd;
pub mod dependencies;
pub mod df;
pub mod files;
pub mod findmnt;
pub mod meminfo;
pub mod swap;
pub mod tabfile;
