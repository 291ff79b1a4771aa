pub mod feed_refresher;
