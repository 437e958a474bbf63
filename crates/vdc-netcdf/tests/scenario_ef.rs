//! End-to-end NetCDF collection scenarios from spec.md §8.
//!
//! Scenario E: a 3D variable staggered on its last dimension reads back
//! de-staggered with missing-value propagation across the averaged pair.
//!
//! Scenario F: three files presented out of time order, each carrying an
//! explicit time coordinate, merge into one globally sorted time axis.

use std::path::Path;

use vdc_netcdf::NetCDFCollection;

fn write_staggered_volume(path: &Path, nz: usize, ny: usize, nx_stag: usize, mv: f32, missing_at: &[(usize, usize, usize)]) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("z", nz).unwrap();
    file.add_dimension("y", ny).unwrap();
    file.add_dimension("x_stag", nx_stag).unwrap();
    let mut var = file.add_variable::<f32>("U", &["z", "y", "x_stag"]).unwrap();

    let mut data = vec![0.0_f32; nz * ny * nx_stag];
    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx_stag {
                data[(z * ny + y) * nx_stag + x] = x as f32;
            }
        }
    }
    for &(z, y, x) in missing_at {
        data[(z * ny + y) * nx_stag + x] = mv;
    }
    var.put_values(&data, None, None).unwrap();
    if !missing_at.is_empty() {
        var.put_attribute("_FillValue", mv).unwrap();
    }
}

#[test]
fn staggered_last_dim_destaggers_to_half_offset_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("u.nc");
    let (nz, ny, nx_stag) = (2, 3, 5);
    write_staggered_volume(&path, nz, ny, nx_stag, -999.0, &[]);

    let mut coll = NetCDFCollection::open(vec![path], None, None).unwrap();
    coll.mark_staggered("x_stag");
    let (data, dims) = coll.read_volume(0, "U").unwrap();
    assert_eq!(dims, (nx_stag - 1, ny, nz));

    // v[z,y,x] = x on the staggered grid -> unstaggered value at x is x+0.5.
    for &v in &data {
        assert!((v.fract() - 0.5).abs() < 1e-6 || (v.fract() + 0.5).abs() < 1e-6, "expected a half-integer value, got {v}");
    }
    assert!((data[0] - 0.5).abs() < 1e-6);
}

#[test]
fn staggered_read_propagates_missing_value_across_the_average() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("u_missing.nc");
    let (nz, ny, nx_stag) = (1, 1, 3);
    write_staggered_volume(&path, nz, ny, nx_stag, -999.0, &[(0, 0, 1)]);

    let mut coll = NetCDFCollection::open(vec![path], None, None).unwrap();
    coll.mark_staggered("x_stag");
    let (data, dims) = coll.read_volume(0, "U").unwrap();
    assert_eq!(dims, (2, 1, 1));
    // x_stag values are [0, missing, 2]; both averaged pairs touch the
    // missing sample, so both unstaggered outputs must read back missing.
    assert_eq!(data, vec![-999.0, -999.0]);
}

fn write_time_file(path: &Path, stamps: &[f64]) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", stamps.len()).unwrap();
    file.add_dimension("y", 1).unwrap();
    file.add_dimension("x", 1).unwrap();
    let mut var = file.add_variable::<f32>("TEMP", &["time", "y", "x"]).unwrap();
    let data: Vec<f32> = stamps.iter().map(|&s| s as f32).collect();
    var.put_values(&data, None, None).unwrap();
    let mut time_var = file.add_variable::<f64>("time", &["time"]).unwrap();
    time_var.put_values(stamps, None, None).unwrap();
}

#[test]
fn out_of_order_files_merge_into_one_globally_sorted_time_axis() {
    let dir = tempfile::tempdir().unwrap();
    let p0 = dir.path().join("a.nc");
    let p1 = dir.path().join("b.nc");
    let p2 = dir.path().join("c.nc");
    write_time_file(&p0, &[10.0, 20.0]);
    write_time_file(&p1, &[0.0]);
    write_time_file(&p2, &[30.0, 40.0]);

    let coll = NetCDFCollection::open(vec![p0, p1, p2], Some("time"), Some("time")).unwrap();
    assert_eq!(coll.num_time_steps(), 5);

    let expect = [(0.0, 1, 0), (10.0, 0, 0), (20.0, 0, 1), (30.0, 2, 0), (40.0, 2, 1)];
    for (ts, &(stamp, file_index, local)) in expect.iter().enumerate() {
        assert_eq!(coll.user_time(ts), Some(stamp));
        let entry = coll.time_entry(ts).unwrap();
        assert_eq!(entry.file_index, file_index);
        assert_eq!(entry.local_time_index, local);
    }
}
