
fn main() {
    let dir = tempfile::tempdir().unwrap();
    let entry = dir.path().join("main.juno");
    std::fs::write(&entry, "struct Point { X i32; Y i32; } function(p Point) Magnitude() i32 { return p.X * p.X + p.Y * p.Y; } function main(args [str]) void { local pt Point = Point{ X: 3, Y: 4 }; println(pt.Magnitude()); return; }").unwrap();
    let (jobs, mut state) = junoc::forward_declare::Resolver::resolve_entry(&entry).unwrap();
    let job = &jobs[&entry];
    let out = junoc::analysis::analyze_file(job, &mut state.types, &mut state.containers).unwrap();
    println!("{}", out);
}
