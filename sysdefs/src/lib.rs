pub mod filesystems;
