pub mod event_list;
pub mod team_detail;
pub mod teams_table;
