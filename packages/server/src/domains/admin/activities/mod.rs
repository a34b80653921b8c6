mod offline_errands;

pub use offline_errands::{
    assign_offline_runner, create_offline_errand, list_errands, ErrandFilter,
};
