pub mod m202508230001_create_tasks;
