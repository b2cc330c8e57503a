use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};

use tablefs::{ClusterRegistry, FileStore, RootFolder, StoreConfig};

fn bench_store() -> FileStore {
    FileStore::new(
        StoreConfig::with_contact_points("127.0.0.1"),
        RootFolder::new("/bench/app"),
        Arc::new(ClusterRegistry::new()),
    )
}

fn bench_file_ops(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ns = [100usize, 1_000usize];
    let mut group = c.benchmark_group("file_ops");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(20);

    for &n in &ns {
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("save", n.to_string()), &n, |b, &n| {
            let fs = bench_store();
            rt.block_on(fs.create_folder("/bench/app/docs/")).unwrap();
            b.iter(|| {
                rt.block_on(async {
                    for i in 0..n {
                        fs.save(&format!("/bench/app/docs/f{}.txt", i), "payload").await.unwrap();
                    }
                });
            });
        });

        group.bench_with_input(BenchmarkId::new("load", n.to_string()), &n, |b, &n| {
            let fs = bench_store();
            rt.block_on(async {
                fs.create_folder("/bench/app/docs/").await.unwrap();
                for i in 0..n {
                    fs.save(&format!("/bench/app/docs/f{}.txt", i), "payload").await.unwrap();
                }
            });
            b.iter(|| {
                rt.block_on(async {
                    for i in 0..n {
                        let v = fs.load(&format!("/bench/app/docs/f{}.txt", i)).await.unwrap();
                        criterion::black_box(v);
                    }
                });
            });
        });

        group.bench_with_input(BenchmarkId::new("list", n.to_string()), &n, |b, &n| {
            let fs = bench_store();
            rt.block_on(async {
                fs.create_folder("/bench/app/docs/").await.unwrap();
                for i in 0..n {
                    fs.save(&format!("/bench/app/docs/f{}.txt", i), "payload").await.unwrap();
                }
            });
            b.iter(|| {
                let listed =
                    rt.block_on(fs.list_files("/bench/app/docs/", Some(".txt"))).unwrap();
                criterion::black_box(listed);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_file_ops);
criterion_main!(benches);
