use cellgrid_physics::{GrowthCommand, Material, Scheduler, Tunables};

fn material_char(material: Material) -> char {
    match material {
        Material::Air => ' ',
        Material::Dirt => '#',
        Material::Water => '~',
        Material::Sand => '.',
        Material::Wood => '=',
        Material::Metal => '%',
        Material::Leaf => '"',
        Material::Wall => '@',
        Material::Seed => 'o',
        Material::Root => '/',
    }
}

fn print_grid(grid: &cellgrid_physics::Grid) {
    for y in 0..grid.height() {
        let mut row = String::with_capacity(grid.width() as usize);
        for x in 0..grid.width() {
            row.push(material_char(grid.at(x, y).material));
        }
        println!("{row}");
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let grid = cellgrid_physics::Grid::with_wall_perimeter(40, 30);
    let mut scheduler = Scheduler::new(grid, Tunables::default());

    for y in 1..10 {
        scheduler.queue_command(GrowthCommand::ConvertCell {
            at: (10, y),
            material: Material::Sand,
            fill: 1.0,
        });
        scheduler.queue_command(GrowthCommand::ConvertCell {
            at: (20, y),
            material: Material::Water,
            fill: 1.0,
        });
    }

    loop {
        scheduler.advance(0.05);
        print_grid(scheduler.grid());
        println!("------ tick {} ------", scheduler.stats().tick);
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
}
