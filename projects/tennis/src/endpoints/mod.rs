pub mod dashboard {
    pub mod router;
    pub mod home {
        pub mod index;
    }
    pub mod stat_options {
        pub mod index;
    }
    pub mod stat_table {
        pub mod index;
    }
    pub mod stat_chart {
        pub mod index;
    }
}
