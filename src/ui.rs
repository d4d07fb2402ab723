use crate::calendar::CalendarCursor;
use crate::surface::HtmlSurface;

pub fn render_page(surface: &HtmlSurface, cursor: CalendarCursor, prefilled: bool) -> String {
    PAGE_HTML
        .replace("{{HEADER}}", surface.header())
        .replace("{{GRID}}", &surface.grid_html())
        .replace("{{YEAR}}", &cursor.year.to_string())
        .replace("{{MONTH}}", &cursor.month.to_string())
        .replace("{{PREFILLED}}", if prefilled { "true" } else { "false" })
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="vi">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Lịch vạn niên</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.6rem, 4vw, 2.4rem);
      margin: 0;
    }

    .nav {
      appearance: none;
      border: none;
      border-radius: 999px;
      width: 44px;
      height: 44px;
      font-size: 1.2rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    .weekdays,
    .calendar-grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 8px;
    }

    .weekdays span {
      text-align: center;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .calendar-day {
      background: white;
      border-radius: 14px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      padding: 10px 8px;
      min-height: 68px;
      display: grid;
      gap: 4px;
      cursor: pointer;
    }

    .calendar-day .solar {
      font-size: 1.2rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .calendar-day .lunar {
      font-size: 0.75rem;
      color: #7a746d;
    }

    .calendar-day.today {
      border-color: var(--accent);
      box-shadow: 0 8px 16px rgba(255, 107, 74, 0.2);
    }

    .calendar-day.new-moon .lunar {
      color: var(--accent);
      font-weight: 600;
    }

    .calendar-day[data-state="error"] .lunar {
      color: #c63b2b;
    }

    .modal {
      position: fixed;
      inset: 0;
      background: rgba(43, 42, 40, 0.45);
      display: none;
      align-items: center;
      justify-content: center;
      padding: 18px;
    }

    .modal.open {
      display: flex;
    }

    .modal-card {
      background: white;
      border-radius: 22px;
      padding: 24px;
      width: min(420px, 100%);
      display: grid;
      gap: 16px;
      box-shadow: var(--shadow);
    }

    .modal-card header h2 {
      margin: 0;
      font-size: 1.3rem;
    }

    .detail {
      display: grid;
      grid-template-columns: auto 1fr;
      gap: 8px 16px;
      margin: 0;
    }

    .detail dt {
      font-size: 0.8rem;
      text-transform: uppercase;
      color: #8b857d;
    }

    .detail dd {
      margin: 0;
      font-weight: 600;
    }

    .modal-error {
      color: #c63b2b;
    }

    @media (max-width: 600px) {
      .app {
        padding: 24px 14px;
      }
      .calendar-day {
        min-height: 54px;
        padding: 6px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <button class="nav" id="prevMonth" type="button" aria-label="Tháng trước">&lsaquo;</button>
      <h1 id="monthYear">{{HEADER}}</h1>
      <button class="nav" id="nextMonth" type="button" aria-label="Tháng sau">&rsaquo;</button>
    </header>

    <div class="weekdays">
      <span>CN</span><span>T2</span><span>T3</span><span>T4</span><span>T5</span><span>T6</span><span>T7</span>
    </div>
    <div class="calendar-grid" id="calendarGrid" data-year="{{YEAR}}" data-month="{{MONTH}}" data-prefilled="{{PREFILLED}}">{{GRID}}</div>
  </main>

  <div class="modal" id="dayDetailModal" role="dialog" aria-modal="true">
    <div class="modal-card">
      <header>
        <h2 id="modalTitle"></h2>
        <button class="nav" id="closeModalBtn" type="button" aria-label="Đóng">&times;</button>
      </header>
      <div id="modalBody"></div>
    </div>
  </div>

  <script>
    const els = {
      grid: document.getElementById('calendarGrid'),
      header: document.getElementById('monthYear'),
      prev: document.getElementById('prevMonth'),
      next: document.getElementById('nextMonth'),
      modal: document.getElementById('dayDetailModal'),
      modalTitle: document.getElementById('modalTitle'),
      modalBody: document.getElementById('modalBody'),
      close: document.getElementById('closeModalBtn')
    };

    const DETAIL_TIMEOUT_MS = 8000;

    const view = {
      year: Number(els.grid.dataset.year),
      month: Number(els.grid.dataset.month),
      generation: 0,
      opens: 0,
      waitingOn: null
    };

    const escapeHtml = (text) =>
      String(text).replace(/[&<>"']/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' })[c]);

    const pad = (n) => String(n).padStart(2, '0');

    const cells = () => Array.from(els.grid.querySelectorAll('.calendar-day'));

    const setLunar = (cell, state, text, newMoon) => {
      cell.dataset.state = state;
      cell.classList.toggle('new-moon', Boolean(newMoon));
      cell.querySelector('.lunar').textContent = text;
    };

    const wellFormed = (record) =>
      record && typeof record === 'object' && !record.error &&
      Number.isInteger(record.day) && record.day >= 1 && record.day <= 30 &&
      Number.isInteger(record.month) && record.month >= 1 && record.month <= 12;

    const applyLunarBatch = (records, generation) => {
      if (generation !== view.generation) {
        return;
      }
      cells().forEach((cell, index) => {
        const record = records[index];
        if (wellFormed(record)) {
          setLunar(cell, 'ready', `${record.day}/${record.month} AL`, record.day === 1);
        } else {
          setLunar(cell, 'missing', 'N/A', false);
        }
      });
    };

    const failBatch = (generation) => {
      if (generation !== view.generation) {
        return;
      }
      cells()
        .filter((cell) => cell.dataset.state === 'loading')
        .forEach((cell) => setLunar(cell, 'error', 'Lỗi', false));
    };

    const loadLunar = async (generation) => {
      try {
        const res = await fetch('/api/lunar-month-dates', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ month: view.month + 1, year: view.year })
        });
        if (!res.ok) {
          throw new Error(`status ${res.status}`);
        }
        const records = await res.json();
        if (!Array.isArray(records)) {
          throw new Error('malformed body');
        }
        applyLunarBatch(records, generation);
      } catch (err) {
        failBatch(generation);
      }
    };

    const YEAR_MIN = -2147483648;
    const YEAR_MAX = 2147483647;

    // Integer calendar math; Date misreads years 0-99 and runs out past 275760.
    const isLeapYear = (year) => (year % 4 === 0 && year % 100 !== 0) || year % 400 === 0;

    const daysInMonth = (year, month) => {
      if (month === 1) {
        return isLeapYear(year) ? 29 : 28;
      }
      return [3, 5, 8, 10].includes(month) ? 30 : 31;
    };

    const daysFromCivil = (year, month, day) => {
      const y = month <= 2 ? year - 1 : year;
      const era = Math.floor(y / 400);
      const yoe = y - era * 400;
      const mp = (month + 9) % 12;
      const doy = Math.floor((153 * mp + 2) / 5) + day - 1;
      const doe = yoe * 365 + Math.floor(yoe / 4) - Math.floor(yoe / 100) + doy;
      return era * 146097 + doe - 719468;
    };

    // 0 = Sunday; 1970-01-01 was a Thursday.
    const firstWeekday = (year, month) => (((daysFromCivil(year, month + 1, 1) + 4) % 7) + 7) % 7;

    const renderMonth = (year, month) => {
      view.year = year;
      view.month = month;
      view.generation += 1;
      const generation = view.generation;

      const today = new Date();
      const blanks = firstWeekday(year, month);
      const days = daysInMonth(year, month);
      const isCurrentMonth = today.getFullYear() === year && today.getMonth() === month;

      els.header.textContent = `Tháng ${month + 1} năm ${year}`;
      let html = '';
      for (let i = 0; i < blanks; i += 1) {
        html += '<div class="calendar-blank"></div>';
      }
      for (let day = 1; day <= days; day += 1) {
        const todayClass = isCurrentMonth && today.getDate() === day ? ' today' : '';
        html += `<div class="calendar-day${todayClass}" data-day="${day}" data-state="loading"><span class="solar">${day}</span><span class="lunar">...</span></div>`;
      }
      els.grid.innerHTML = html;

      loadLunar(generation);
    };

    const changeMonth = (delta) => {
      const total = view.year * 12 + view.month + delta;
      const year = Math.floor(total / 12);
      if (year > YEAR_MAX) {
        renderMonth(YEAR_MAX, 11);
      } else if (year < YEAR_MIN) {
        renderMonth(YEAR_MIN, 0);
      } else {
        renderMonth(year, ((total % 12) + 12) % 12);
      }
    };

    const showModal = (title) => {
      els.modalTitle.textContent = title;
      els.modal.classList.add('open');
    };

    const closeModal = () => {
      view.waitingOn = null;
      els.modal.classList.remove('open');
    };

    const detailBody = (detail) => {
      const rows = [
        ['Âm lịch', detail.lunar_date],
        ['Năm âm lịch', detail.lunar_year_name],
        ['Tháng âm lịch', detail.lunar_month_name],
        ['Ngày âm lịch', detail.lunar_day_name],
        ['Giờ hoàng đạo', detail.auspicious_hours.join(', ')],
        ['Giờ hắc đạo', detail.inauspicious_hours.join(', ')]
      ];
      return `<dl class="detail">${rows
        .map(([label, value]) => `<dt>${escapeHtml(label)}</dt><dd>${escapeHtml(value)}</dd>`)
        .join('')}</dl>`;
    };

    const openDayDetail = async (day, month, year) => {
      view.opens += 1;
      const openId = view.opens;
      view.waitingOn = openId;
      showModal(`Ngày ${pad(day)}/${pad(month)}/${year}`);
      els.modalBody.innerHTML = '<p class="modal-loading">Đang tải...</p>';

      const controller = new AbortController();
      const timer = setTimeout(() => controller.abort(), DETAIL_TIMEOUT_MS);
      let body;
      try {
        const params = new URLSearchParams({ day, month, year });
        const res = await fetch(`/api/lunar-day-detail?${params}`, { signal: controller.signal });
        if (!res.ok) {
          throw new Error(`status ${res.status}`);
        }
        body = detailBody(await res.json());
      } catch (err) {
        body = '<p class="modal-error">Chức năng đang được cập nhật.</p>';
      } finally {
        clearTimeout(timer);
      }

      if (view.waitingOn !== openId) {
        return;
      }
      view.waitingOn = null;
      els.modalBody.innerHTML = body;
    };

    els.prev.addEventListener('click', () => changeMonth(-1));
    els.next.addEventListener('click', () => changeMonth(1));

    els.grid.addEventListener('click', (event) => {
      const cell = event.target.closest('.calendar-day');
      if (cell) {
        openDayDetail(Number(cell.dataset.day), view.month + 1, view.year);
      }
    });

    els.close.addEventListener('click', closeModal);
    els.modal.addEventListener('click', (event) => {
      if (event.target === els.modal) {
        closeModal();
      }
    });

    // The server already drew the grid; only the lunar labels may be missing.
    view.generation += 1;
    if (els.grid.dataset.prefilled !== 'true') {
      loadLunar(view.generation);
    }
  </script>
</body>
</html>
"#;
