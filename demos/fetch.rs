use pmlb::{DatasetFilter, FetchOptions, Pmlb, Task, TARGET};

fn main() {
    env_logger::init();
    let name = std::env::args()
        .nth(1)
        .expect("Give a dataset name, e.g. `iris`, or `--small` to list small classification sets");
    let pmlb = Pmlb::new().unwrap();

    if name == "--small" {
        let filter = DatasetFilter::new()
            .obs_max(500)
            .task(Task::Classification);
        for name in pmlb.filter_datasets(&filter).unwrap() {
            println!("{name}");
        }
        return;
    }

    let mut options = FetchOptions::new();
    if let Some(cache_dir) = std::env::args().nth(2) {
        options = options.cache_dir(cache_dir);
    }
    let table = pmlb.fetch_data(&name, &options).unwrap();
    println!("{name}: {} rows", table.n_rows());
    for column in table.columns() {
        let marker = if column == TARGET { " (label)" } else { "" };
        println!("  {column}{marker}");
    }
}
