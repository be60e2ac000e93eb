use super::CatalogEntry;

const fn table(
    name: &'static str,
    first_version: &'static str,
    last_version: &'static str,
    is_data: bool,
) -> CatalogEntry {
    CatalogEntry {
        name,
        first_version,
        last_version,
        is_data,
    }
}

// name, first release, last release, carries monitoring data
pub(super) const ZABBIX_TABLES: &[CatalogEntry] = &[
    table("acknowledges", "1.3.1", "7.0.0", true),
    table("actions", "1.3.1", "7.0.0", false),
    table("alerts", "1.3.1", "7.0.0", true),
    table("application_discovery", "2.2.0", "5.2.0", false),
    table("application_prototype", "3.0.0", "5.2.0", false),
    table("application_template", "2.2.0", "5.2.0", false),
    table("applications", "1.3.1", "5.2.0", false),
    table("auditlog", "1.3.1", "7.0.0", true),
    table("auditlog_details", "1.7", "5.4.0", true),
    table("autoreg_host", "1.7", "7.0.0", false),
    table("changelog", "7.0.0", "7.0.0", true),
    table("conditions", "1.3.1", "7.0.0", false),
    table("config", "1.3.1", "7.0.0", false),
    table("config_autoreg_tls", "4.4.0", "7.0.0", false),
    table("connector", "6.4.0", "7.0.0", false),
    table("connector_tag", "6.4.0", "7.0.0", false),
    table("corr_condition", "3.2.0", "7.0.0", false),
    table("corr_condition_group", "3.2.0", "7.0.0", false),
    table("corr_condition_tag", "3.2.0", "7.0.0", false),
    table("corr_condition_tagpair", "3.2.0", "7.0.0", false),
    table("corr_condition_tagvalue", "3.2.0", "7.0.0", false),
    table("corr_operation", "3.2.0", "7.0.0", false),
    table("correlation", "3.2.0", "7.0.0", false),
    table("dashboard", "3.4.0", "7.0.0", false),
    table("dashboard_page", "5.4.0", "7.0.0", false),
    table("dashboard_user", "3.4.0", "7.0.0", false),
    table("dashboard_usrgrp", "3.4.0", "7.0.0", false),
    table("dbversion", "2.2.0", "7.0.0", false),
    table("dchecks", "1.3.1", "7.0.0", false),
    table("dhosts", "1.3.1", "7.0.0", false),
    table("drules", "1.3.1", "7.0.0", false),
    table("dservices", "1.3.1", "7.0.0", false),
    table("escalations", "1.5.3", "7.0.0", true),
    table("event_recovery", "3.2.0", "7.0.0", true),
    table("event_suppress", "4.0.0", "7.0.0", true),
    table("event_symptom", "6.4.0", "7.0.0", true),
    table("event_tag", "3.2.0", "7.0.0", true),
    table("events", "1.3.1", "7.0.0", true),
    table("expressions", "1.7", "7.0.0", false),
    table("functions", "1.3.1", "7.0.0", false),
    table("globalmacro", "1.7", "7.0.0", false),
    table("globalvars", "1.7", "7.0.0", false),
    table("graph_discovery", "2.0.0", "7.0.0", false),
    table("graph_theme", "1.7", "7.0.0", false),
    table("graphs", "1.3.1", "7.0.0", false),
    table("graphs_items", "1.3.1", "7.0.0", false),
    table("group_discovery", "2.2.0", "7.0.0", false),
    table("group_prototype", "2.2.0", "7.0.0", false),
    table("ha_node", "6.0.0", "7.0.0", true),
    table("hgset", "7.0.0", "7.0.0", false),
    table("hgset_group", "7.0.0", "7.0.0", false),
    table("history", "1.3.1", "7.0.0", true),
    table("history_bin", "7.0.0", "7.0.0", true),
    table("history_log", "1.3.1", "7.0.0", true),
    table("history_str", "1.3.1", "7.0.0", true),
    table("history_str_sync", "1.3.1", "2.2.0", true),
    table("history_sync", "1.3.1", "2.2.0", true),
    table("history_text", "1.3.1", "7.0.0", true),
    table("history_uint", "1.3.1", "7.0.0", true),
    table("history_uint_sync", "1.3.1", "2.2.0", true),
    table("host_discovery", "2.0.0", "7.0.0", false),
    table("host_hgset", "7.0.0", "7.0.0", false),
    table("host_inventory", "1.7", "7.0.0", false),
    table("host_proxy", "7.0.0", "7.0.0", false),
    table("host_rtdata", "5.0.0", "7.0.0", true),
    table("host_tag", "4.2.0", "7.0.0", false),
    table("hostmacro", "1.7", "7.0.0", false),
    table("hosts", "1.3.1", "7.0.0", false),
    table("hosts_groups", "1.3.1", "7.0.0", false),
    table("hosts_templates", "1.3.1", "7.0.0", false),
    table("housekeeper", "1.3.1", "7.0.0", true),
    table("hstgrp", "1.3.1", "7.0.0", false),
    table("httpstep", "1.3.1", "7.0.0", false),
    table("httpstep_field", "3.0.0", "7.0.0", false),
    table("httpstepitem", "1.3.1", "7.0.0", false),
    table("httptest", "1.3.1", "7.0.0", false),
    table("httptest_field", "3.0.0", "7.0.0", false),
    table("httptest_tag", "5.4.0", "7.0.0", false),
    table("httptestitem", "1.3.1", "7.0.0", false),
    table("icon_map", "1.7", "7.0.0", false),
    table("icon_mapping", "1.7", "7.0.0", false),
    table("ids", "1.3.1", "7.0.0", false),
    table("images", "1.3.1", "7.0.0", false),
    table("interface", "2.0.0", "7.0.0", false),
    table("interface_discovery", "2.2.0", "7.0.0", false),
    table("interface_snmp", "5.0.0", "7.0.0", false),
    table("item_application_prototype", "3.0.0", "5.2.0", false),
    table("item_condition", "2.2.0", "7.0.0", false),
    table("item_discovery", "2.0.0", "7.0.0", false),
    table("item_parameter", "5.4.0", "7.0.0", false),
    table("item_preproc", "3.4.0", "7.0.0", false),
    table("item_rtdata", "4.4.0", "7.0.0", true),
    table("item_tag", "5.4.0", "7.0.0", false),
    table("items", "1.3.1", "7.0.0", false),
    table("items_applications", "1.3.1", "5.2.0", false),
    table("lld_macro_path", "4.2.0", "7.0.0", false),
    table("lld_override", "5.0.0", "7.0.0", false),
    table("lld_override_condition", "5.0.0", "7.0.0", false),
    table("lld_override_opdiscover", "5.0.0", "7.0.0", false),
    table("lld_override_operation", "5.0.0", "7.0.0", false),
    table("lld_override_ophistory", "5.0.0", "7.0.0", false),
    table("lld_override_opinventory", "5.0.0", "7.0.0", false),
    table("lld_override_opperiod", "5.0.0", "7.0.0", false),
    table("lld_override_opseverity", "5.0.0", "7.0.0", false),
    table("lld_override_opstatus", "5.0.0", "7.0.0", false),
    table("lld_override_optag", "5.0.0", "7.0.0", false),
    table("lld_override_optemplate", "5.0.0", "7.0.0", false),
    table("lld_override_optrends", "5.0.0", "7.0.0", false),
    table("maintenance_tag", "4.0.0", "7.0.0", false),
    table("maintenances", "1.7", "7.0.0", false),
    table("maintenances_groups", "1.7", "7.0.0", false),
    table("maintenances_hosts", "1.7", "7.0.0", false),
    table("maintenances_windows", "1.7", "7.0.0", false),
    table("media", "1.3.1", "7.0.0", false),
    table("media_type", "1.3.1", "7.0.0", false),
    table("media_type_message", "5.0.0", "7.0.0", false),
    table("media_type_param", "4.4.0", "7.0.0", false),
    table("mfa", "7.0.0", "7.0.0", false),
    table("mfa_totp_secret", "7.0.0", "7.0.0", false),
    table("module", "5.0.0", "7.0.0", false),
    table("opcommand", "2.0.0", "7.0.0", false),
    table("opcommand_grp", "1.7", "7.0.0", false),
    table("opcommand_hst", "1.7", "7.0.0", false),
    table("opconditions", "1.5.3", "7.0.0", false),
    table("operations", "1.3.1", "7.0.0", false),
    table("opgroup", "1.7", "7.0.0", false),
    table("opinventory", "3.0.0", "7.0.0", false),
    table("opmessage", "1.7", "7.0.0", false),
    table("opmessage_grp", "1.7", "7.0.0", false),
    table("opmessage_usr", "1.7", "7.0.0", false),
    table("optemplate", "1.7", "7.0.0", false),
    table("permission", "7.0.0", "7.0.0", false),
    table("problem", "3.4.0", "7.0.0", true),
    table("problem_tag", "3.4.0", "7.0.0", true),
    table("profiles", "1.3.1", "7.0.0", false),
    table("proxy", "7.0.0", "7.0.0", false),
    table("proxy_autoreg_host", "2.2.0", "7.0.0", true),
    table("proxy_dhistory", "1.3.1", "7.0.0", true),
    table("proxy_group", "7.0.0", "7.0.0", false),
    table("proxy_history", "1.3.1", "7.0.0", true),
    table("proxy_rtdata", "7.0.0", "7.0.0", true),
    table("regexps", "1.7", "7.0.0", false),
    table("report", "5.4.0", "7.0.0", false),
    table("report_param", "5.4.0", "7.0.0", false),
    table("report_user", "5.4.0", "7.0.0", false),
    table("report_usrgrp", "5.4.0", "7.0.0", false),
    table("rights", "1.3.1", "7.0.0", false),
    table("role", "5.2.0", "7.0.0", false),
    table("role_rule", "5.2.0", "7.0.0", false),
    table("screen_user", "3.0.0", "5.2.0", false),
    table("screen_usrgrp", "3.0.0", "5.2.0", false),
    table("screens", "1.3.1", "5.2.0", false),
    table("screens_items", "1.3.1", "5.2.0", false),
    table("script_param", "5.4.0", "7.0.0", false),
    table("scripts", "1.3.1", "7.0.0", false),
    table("service_alarms", "1.3.1", "7.0.0", true),
    table("service_problem", "6.0.0", "7.0.0", true),
    table("service_problem_tag", "6.0.0", "7.0.0", true),
    table("service_status_rule", "6.0.0", "7.0.0", false),
    table("service_tag", "6.0.0", "7.0.0", false),
    table("services", "1.3.1", "7.0.0", false),
    table("services_links", "1.3.1", "7.0.0", false),
    table("services_times", "1.5.3", "5.4.0", false),
    table("sessions", "1.3.1", "7.0.0", true),
    table("settings", "5.2.0", "7.0.0", false),
    table("sla", "6.0.0", "7.0.0", false),
    table("sla_excluded_downtime", "6.0.0", "7.0.0", false),
    table("sla_schedule", "6.0.0", "7.0.0", false),
    table("sla_service_tag", "6.0.0", "7.0.0", false),
    table("slides", "1.3.1", "5.2.0", false),
    table("slideshow_user", "3.0.0", "5.2.0", false),
    table("slideshow_usrgrp", "3.0.0", "5.2.0", false),
    table("slideshows", "1.3.1", "5.2.0", false),
    table("sysmap_element_trigger", "3.4.0", "7.0.0", false),
    table("sysmap_element_url", "1.7", "7.0.0", false),
    table("sysmap_shape", "3.4.0", "7.0.0", false),
    table("sysmap_url", "1.7", "7.0.0", false),
    table("sysmap_user", "3.0.0", "7.0.0", false),
    table("sysmap_usrgrp", "3.0.0", "7.0.0", false),
    table("sysmaps", "1.3.1", "7.0.0", false),
    table("sysmaps_element_tag", "5.0.0", "7.0.0", false),
    table("sysmaps_elements", "1.3.1", "7.0.0", false),
    table("sysmaps_link_triggers", "1.3.1", "7.0.0", false),
    table("sysmaps_links", "1.3.1", "7.0.0", false),
    table("tag_filter", "3.4.0", "7.0.0", false),
    table("task", "3.2.0", "7.0.0", true),
    table("task_acknowledge", "3.4.0", "7.0.0", true),
    table("task_check_now", "4.0.0", "7.0.0", true),
    table("task_close_problem", "3.2.0", "7.0.0", true),
    table("task_data", "5.0.0", "7.0.0", true),
    table("task_remote_command", "3.4.0", "7.0.0", true),
    table("task_remote_command_result", "3.4.0", "7.0.0", true),
    table("task_result", "5.0.0", "7.0.0", true),
    table("timeperiods", "1.7", "7.0.0", false),
    table("token", "5.4.0", "7.0.0", false),
    table("trends", "1.3.1", "7.0.0", true),
    table("trends_uint", "1.3.1", "7.0.0", true),
    table("trigger_depends", "1.3.1", "7.0.0", false),
    table("trigger_discovery", "2.0.0", "7.0.0", false),
    table("trigger_queue", "6.0.0", "7.0.0", true),
    table("trigger_tag", "3.2.0", "7.0.0", false),
    table("triggers", "1.3.1", "7.0.0", false),
    table("ugset", "7.0.0", "7.0.0", false),
    table("ugset_group", "7.0.0", "7.0.0", false),
    table("user_ugset", "7.0.0", "7.0.0", false),
    table("userdirectory", "6.2.0", "7.0.0", false),
    table("userdirectory_idpgroup", "6.4.0", "7.0.0", false),
    table("userdirectory_ldap", "6.4.0", "7.0.0", false),
    table("userdirectory_media", "6.4.0", "7.0.0", false),
    table("userdirectory_saml", "6.4.0", "7.0.0", false),
    table("userdirectory_usrgrp", "6.4.0", "7.0.0", false),
    table("users", "1.3.1", "7.0.0", false),
    table("users_groups", "1.3.1", "7.0.0", false),
    table("usrgrp", "1.3.1", "7.0.0", false),
    table("valuemap", "1.3.1", "7.0.0", false),
    table("valuemap_mapping", "5.4.0", "7.0.0", false),
    table("widget", "3.4.0", "7.0.0", false),
    table("widget_field", "3.4.0", "7.0.0", false),
];
