use bayesbox_gp::kernels::SquaredExponentialKernel;
use bayesbox_gp::{GaussianProcess, SurrogateModel};
use criterion::{criterion_group, criterion_main, Criterion};
use linfa::prelude::{Dataset, Fit};
use linfa::ParamGuard;
use ndarray::{Array, Array1, Axis};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256Plus;

fn criterion_gp(c: &mut Criterion) {
    let dims = [2, 5, 10];
    let nts = [50, 100, 200];

    let mut group = c.benchmark_group("gp");
    group.sample_size(20);
    for (&dim, &nt) in dims.iter().zip(nts.iter()) {
        let griewank = |x: &Array1<f64>| -> f64 {
            let d = Array1::linspace(1., dim as f64, dim).mapv(|v| v.sqrt());
            x.mapv(|v| v * v).sum() / 4000. - (x / &d).mapv(|v| v.cos()).fold(1., |acc, x| acc * x)
                + 1.0
        };
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let xt = Array::random_using((nt, dim), Uniform::new(-600., 600.), &mut rng);
        let yt = xt.map_axis(Axis(1), |x| griewank(&x.to_owned()));
        let lower = Array1::from_elem(dim, -600.);
        let upper = Array1::from_elem(dim, 600.);
        let params = GaussianProcess::params(SquaredExponentialKernel::new(0.2))
            .bounds(lower, upper)
            .check()
            .expect("GP params");

        group.bench_function(format!("gp fit {dim}"), |b| {
            b.iter(|| {
                std::hint::black_box(
                    params
                        .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
                        .expect("GP fit error"),
                )
            });
        });

        let gp = params
            .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
            .expect("GP fit error");
        let xtest = Array::random_using((100, dim), Uniform::new(-600., 600.), &mut rng);
        group.bench_function(format!("gp predict {dim}"), |b| {
            b.iter(|| std::hint::black_box(gp.predict(&xtest).expect("GP prediction")));
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_gp);
criterion_main!(benches);
